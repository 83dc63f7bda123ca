use std::io::{self, BufRead, Write};

use crate::data::input::RawInput;
use crate::data::profile::AssemblyProfile;
use crate::estimator::EstimateRequest;

/// Line-oriented prompts that re-ask until the answer parses.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Prompter { reader, writer }
    }

    fn read_answer(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Empty answer takes `default`.
    pub fn number(&mut self, prompt: &str, default: f64) -> io::Result<f64> {
        loop {
            let answer = self.read_answer(&format!("{} [{}]: ", prompt, default))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<f64>() {
                Ok(num) if num.is_finite() => return Ok(num),
                _ => writeln!(self.writer, "Please enter a valid number")?,
            }
        }
    }

    pub fn year(&mut self, prompt: &str, default: i32) -> io::Result<i32> {
        loop {
            let answer = self.read_answer(&format!("{} [{}]: ", prompt, default))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse() {
                Ok(year) => return Ok(year),
                Err(_) => writeln!(self.writer, "Please enter a valid year")?,
            }
        }
    }

    /// Free text; empty answer means "not provided".
    pub fn text(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let answer = self.read_answer(&format!("{}: ", prompt))?;
        Ok(if answer.is_empty() { None } else { Some(answer) })
    }

    pub fn yes_no(&mut self, prompt: &str) -> io::Result<bool> {
        loop {
            let answer = self.read_answer(&format!("{} [y/N]: ", prompt))?;
            match answer.to_lowercase().as_str() {
                "" | "n" | "no" => return Ok(false),
                "y" | "yes" => return Ok(true),
                _ => writeln!(self.writer, "Please answer y or n")?,
            }
        }
    }
}

/// Asks for every field the profile knows, then the projection horizon.
pub fn prompt_request<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    profile: &AssemblyProfile,
    current_year: i32,
) -> io::Result<EstimateRequest> {
    let mut input = RawInput::new();
    for rule in &profile.numeric {
        let value = prompter.number(&rule.field, 0.0)?;
        input.numeric.insert(rule.field.clone(), value);
    }
    for rule in &profile.categories {
        if let Some(value) = prompter.text(&rule.field)? {
            input.categorical.insert(rule.field.clone(), value);
        }
    }
    for rule in &profile.flags {
        let value = prompter.yes_no(&rule.field)?;
        input.flags.insert(rule.field.clone(), value);
    }

    let target_year = prompter.year("Project value to year", current_year + 1)?;
    let annual_rate = prompter.number("Expected yearly growth (%)", 6.0)?;

    Ok(EstimateRequest {
        input,
        target_year,
        annual_rate,
        current_year: Some(current_year),
        current_month: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(answers: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_number_retries_until_valid() {
        let mut p = prompter("abc\nNaN\n42.5\n");
        assert_eq!(p.number("Area", 50.0).unwrap(), 42.5);
        let output = String::from_utf8(p.writer).unwrap();
        assert_eq!(output.matches("Please enter a valid number").count(), 2);
    }

    #[test]
    fn test_empty_answers_take_defaults() {
        let mut p = prompter("\n\n\n");
        assert_eq!(p.number("Area", 50.0).unwrap(), 50.0);
        assert_eq!(p.year("Target year", 2030).unwrap(), 2030);
        assert!(!p.yes_no("Superhost?").unwrap());
    }

    #[test]
    fn test_text_and_yes_no() {
        let mut p = prompter("  ASA NORTE \nmaybe\nYes\n");
        assert_eq!(p.text("Bairro").unwrap().as_deref(), Some("ASA NORTE"));
        assert!(p.yes_no("Instant book?").unwrap());
    }

    #[test]
    fn test_prompt_request_follows_profile() {
        let mut p = prompter("50\n2\nAsa Norte\n\n2030\n8\n");
        let request = prompt_request(&mut p, &AssemblyProfile::real_estate(), 2024).unwrap();

        assert_eq!(request.input.numeric["area"], 50.0);
        assert_eq!(request.input.numeric["quartos"], 2.0);
        assert_eq!(request.input.categorical["bairro"], "Asa Norte");
        assert!(!request.input.categorical.contains_key("tipo"));
        assert_eq!(request.target_year, 2030);
        assert_eq!(request.annual_rate, 8.0);
        assert_eq!(request.current_year, Some(2024));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("");
        let err = p.number("Area", 1.0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
