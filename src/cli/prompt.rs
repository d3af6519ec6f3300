//! Interactive approval.

use std::io::{BufRead, Write};

use crate::document::DiffDocument;
use crate::error::Result;
use crate::workflow::Approver;

/// Asks the operator on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptApprover;

impl Approver for PromptApprover {
    fn approve(&self, router: &str, _diff: &DiffDocument) -> Result<bool> {
        let stdin = std::io::stdin();
        ask(router, &mut stdin.lock(), &mut std::io::stderr())
    }
}

fn ask(router: &str, input: &mut dyn BufRead, prompt: &mut dyn Write) -> Result<bool> {
    write!(prompt, "Do you want to apply this configuration to {router}? [y/N]: ")?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

/// Only an explicit `y` or `yes` approves.
fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_answers() {
        for (answer, expected) in [
            ("y\n", true),
            ("Y\n", true),
            (" yes \n", true),
            ("\n", false),
            ("n\n", false),
            ("yep\n", false),
            ("", false),
        ] {
            let mut prompt = Vec::new();
            let approved = ask("edge1", &mut Cursor::new(answer), &mut prompt).expect("ask");
            assert_eq!(approved, expected, "answer {answer:?}");
            assert_eq!(
                String::from_utf8(prompt).expect("utf8"),
                "Do you want to apply this configuration to edge1? [y/N]: "
            );
        }
    }
}
