//! `#{name}` placeholders in command templates. `##` is a literal `#`.

use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

pub type Result = std::result::Result<String, InterpError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{0}' at {}", .1+1)]
    UndefinedVar(String, usize),

    #[error("Unclosed brace (found open brace at {})", .0+1)]
    UnclosedBrace(usize),
}

pub fn interp<K, V>(template: &str, variables: &HashMap<K, V>) -> Result
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum State {
        Text,
        AfterHash,
        InName { open_at: usize },
    }

    let mut state = State::Text;
    let mut out = String::with_capacity(template.len() * 2);
    let mut name = String::new();

    for (i, c) in template.chars().enumerate() {
        state = match (state, c) {
            (State::Text, '#') => State::AfterHash,
            (State::Text, c) => {
                out.push(c);
                State::Text
            }
            (State::AfterHash, '#') => {
                out.push('#');
                State::Text
            }
            (State::AfterHash, '{') => {
                name.clear();
                State::InName { open_at: i }
            }
            (State::AfterHash, c) => {
                out.push('#');
                out.push(c);
                State::Text
            }
            (State::InName { open_at }, '}') => {
                let Some(value) = variables.get(name.as_str()) else {
                    return Err(InterpError::UndefinedVar(name, open_at))
                };
                out += &value.as_ref().to_string_lossy();
                State::Text
            }
            (s @ State::InName { .. }, c) => {
                name.push(c);
                s
            }
        };
    }

    match state {
        State::Text => Ok(out),
        State::AfterHash => {
            out.push('#');
            Ok(out)
        }
        State::InName { open_at } => Err(InterpError::UnclosedBrace(open_at)),
    }
}
