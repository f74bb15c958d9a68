//! Line-oriented console session.
//!
//! Sends an opening request, then forwards each non-empty line to the
//! orchestrator until `quit` or end of input.

use narrator_core::Orchestrator;
use std::io::{self, BufRead, Write};

pub const OPENING_REQUEST: &str =
    "Start a Dungeons & Dragons adventure. Present the initial context and ask the player what they do.";

const PROMPT: &str = "Your action > ";
const RULE: &str = "------------------------------------------";

/// Run a session over the given input and output.
///
/// Per-call errors are reported on stderr and the session continues. Only
/// I/O errors on `output` end it early.
pub async fn run<R, W>(orchestrator: &mut Orchestrator, input: R, mut output: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{RULE}")?;
    writeln!(output, "|     Narrator agent D&D - v{}       |", env!("CARGO_PKG_VERSION"))?;
    writeln!(output, "{RULE}")?;
    writeln!(output)?;
    writeln!(output, "The narrator prepares your adventure...")?;
    writeln!(output)?;
    output.flush()?;

    match orchestrator.handle(OPENING_REQUEST).await {
        Ok(intro) => writeln!(output, "{intro}")?,
        Err(e) => eprintln!("Error: {e}"),
    }

    writeln!(output)?;
    writeln!(output, "{RULE}")?;
    writeln!(output, "Type your actions or 'quit' to exit")?;
    writeln!(output, "{RULE}")?;
    writeln!(output)?;

    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {e}");
                break;
            }
            None => {
                writeln!(output)?;
                writeln!(output, "Input ended. Goodbye!")?;
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("quit") {
            writeln!(output)?;
            writeln!(output, "Your adventure ends here. See you soon, brave adventurer!")?;
            break;
        }

        writeln!(output)?;
        match orchestrator.handle(line).await {
            Ok(reply) => {
                writeln!(output, "{reply}")?;
                writeln!(output)?;
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    output.flush()
}
