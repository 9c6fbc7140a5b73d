//! The interactive prompt loop.

use std::io::Write;

use nodes::{PipelineExecutor, PipelineOutcome};
use pipeline::Concept;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const PROMPT: &str = "Enter a concept to research (or 'quit' to exit): ";

/// Prompts for concepts on `input` until blank input, `quit`/`exit`, or end of
/// input, printing each run's result to `out`.
///
/// A failed run prints `Error: <message>` and the loop continues.
///
/// # Errors
///
/// Only I/O errors on `input` or `out`.
pub async fn run_session<R, W>(
    executor: &PipelineExecutor,
    mut input: R,
    out: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(out, "\n{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            tracing::debug!("End of input");
            return Ok(());
        }

        let trimmed = line.trim();
        if is_exit(trimmed) {
            return Ok(());
        }
        let Some(concept) = Concept::new(trimmed) else {
            return Ok(());
        };

        match executor.run(concept).await {
            Ok(outcome) => print_outcome(out, &outcome)?,
            Err(e) => writeln!(out, "Error: {e}")?,
        }
    }
}

fn is_exit(input: &str) -> bool {
    input.is_empty() || input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")
}

fn print_outcome<W: Write>(out: &mut W, outcome: &PipelineOutcome) -> std::io::Result<()> {
    writeln!(out, "\n=== RESEARCH DATA ===")?;
    writeln!(out, "{}", outcome.formatted_result)?;
    writeln!(out, "\n=== INVESTMENT INSIGHTS ===")?;
    writeln!(out, "{}", outcome.investment_insights)?;
    writeln!(out, "\n=== VISUALIZATION CHARTS ===")?;
    writeln!(out, "Charts have been generated and saved as:")?;
    for (_, path) in outcome.charts.iter() {
        writeln!(out, "- {}", path.display())?;
    }
    Ok(())
}
