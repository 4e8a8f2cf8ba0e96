//! Version string parser.
//!
//! Grammar:
//!
//! ```text
//! version   := component ("." component)* qualifier?
//! component := [0-9]+
//! qualifier := ("-" | "_" | ".")? [A-Za-z] qchar*      (letter-led)
//!            | ("-" | "_") [A-Za-z0-9] qchar*          (separator-led)
//! qchar     := [A-Za-z0-9] | "." | "-" | "_" | "+"
//! ```

use crate::error::MalformedVersionError;

/// Components and qualifier split out of a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub components: Vec<u64>,
    pub qualifier: Option<String>,
}

/// Parse a version string into numeric components and an optional qualifier.
pub fn parse_version(input: &str) -> Result<ParsedVersion, MalformedVersionError> {
    if input.is_empty() {
        return Err(MalformedVersionError::Empty);
    }

    let bytes = input.as_bytes();
    if !bytes[0].is_ascii_digit() {
        return Err(MalformedVersionError::MissingNumericPrefix {
            input: input.to_string(),
        });
    }

    let mut components = Vec::new();
    let mut pos = 0;

    loop {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if start == pos {
            return Err(MalformedVersionError::EmptyComponent {
                input: input.to_string(),
                position: pos,
            });
        }

        let value = input[start..pos]
            .parse::<u64>()
            .map_err(|_| MalformedVersionError::ComponentOverflow {
                input: input.to_string(),
            })?;
        components.push(value);

        if pos == bytes.len() {
            return Ok(ParsedVersion {
                components,
                qualifier: None,
            });
        }

        match bytes[pos] {
            b'.' => {
                let next = bytes.get(pos + 1).copied();
                match next {
                    Some(c) if c.is_ascii_digit() => pos += 1,
                    Some(c) if c.is_ascii_alphabetic() => {
                        return finish_with_qualifier(input, components, pos + 1);
                    }
                    _ => {
                        return Err(MalformedVersionError::EmptyComponent {
                            input: input.to_string(),
                            position: pos + 1,
                        })
                    }
                }
            }
            b'-' | b'_' => return finish_with_qualifier(input, components, pos + 1),
            c if c.is_ascii_alphabetic() => return finish_with_qualifier(input, components, pos),
            _ => return Err(invalid_character(input, pos)),
        }
    }
}

fn finish_with_qualifier(
    input: &str,
    components: Vec<u64>,
    start: usize,
) -> Result<ParsedVersion, MalformedVersionError> {
    let qualifier = &input[start..];
    if qualifier.is_empty() {
        return Err(MalformedVersionError::EmptyQualifier {
            input: input.to_string(),
        });
    }

    let first = qualifier.as_bytes()[0];
    if !first.is_ascii_alphanumeric() {
        return Err(invalid_character(input, start));
    }

    for (offset, c) in qualifier.char_indices() {
        if !is_qualifier_char(c) {
            return Err(invalid_character(input, start + offset));
        }
    }

    Ok(ParsedVersion {
        components,
        qualifier: Some(qualifier.to_string()),
    })
}

fn is_qualifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

fn invalid_character(input: &str, position: usize) -> MalformedVersionError {
    let character = input[position..].chars().next().unwrap_or('\0');
    MalformedVersionError::InvalidCharacter {
        input: input.to_string(),
        character,
        position,
    }
}
