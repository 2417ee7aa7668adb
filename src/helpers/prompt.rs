use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use super::time::{parse_date, DATE_FORMAT};

/// Asks for a report date on `input` until a valid one (or an empty line, meaning `today`) is given
pub fn prompt_for_date<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    today: NaiveDate,
) -> io::Result<NaiveDate> {
    writeln!(
        output,
        "Please enter a date in format YYYY-MM-DD (e.g., 2025-03-09) or press Enter to use today's date ({})",
        today.format(DATE_FORMAT)
    )?;

    loop {
        write!(output, "Date [YYYY-MM-DD]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no date entered",
            ));
        }
        if line.trim().is_empty() {
            return Ok(today);
        }
        match parse_date(&line) {
            Ok(date) => return Ok(date),
            Err(_) => writeln!(
                output,
                "Invalid format! Please use YYYY-MM-DD format (e.g., 2025-03-09)"
            )?,
        }
    }
}
