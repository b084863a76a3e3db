// ABOUTME: Interactive model selection - lists installed models and prompts
// ABOUTME: until the user enters one of them.

use std::io::{self, BufRead, Write};

use toolbridge::error::LlmError;

pub const SELECT_PROMPT: &str = "Please select a model from the list above";

/// Pick a model from `available`, reading answers from `input`.
///
/// Returns `None` when listing failed, nothing is installed, or input ends.
pub fn pick_model<R, W>(
    available: Result<Vec<String>, LlmError>,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    let models = match available {
        Ok(models) => models,
        Err(e) => {
            writeln!(out, "Error fetching Ollama models: {e}")?;
            return Ok(None);
        }
    };

    if models.is_empty() {
        writeln!(out, "No Ollama models found. Please pull a model first.")?;
        return Ok(None);
    }

    writeln!(out, "\nAvailable Ollama Models:")?;
    for name in &models {
        writeln!(out, "  - {name}")?;
    }

    loop {
        write!(out, "{SELECT_PROMPT}: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let choice = line.trim();
        if models.iter().any(|m| m == choice) {
            return Ok(Some(choice.to_string()));
        }
        writeln!(out, "Invalid model name: '{choice}'. Please choose from the list.")?;
    }
}
