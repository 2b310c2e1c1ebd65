use std::io::{self, BufRead, Write};

/// Answers accepted as "go ahead" (compared after trimming and lower casing)
pub const AFFIRMATIVE: [&str; 4] = ["yes", "y", "si", "s"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Declined,
    /// Input closed before an answer was given
    NoInput,
}

/// Asks the operator before `count` emails are sent
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, count: usize) -> io::Result<Confirmation> {
    write!(out, "Se van a enviar {count} correos. Escribí 'si' para continuar: ")?;
    out.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(Confirmation::NoInput);
    }
    let answer = answer.trim().to_lowercase();
    if AFFIRMATIVE.contains(&answer.as_str()) {
        Ok(Confirmation::Proceed)
    } else {
        Ok(Confirmation::Declined)
    }
}
