use std::collections::HashMap;

/// Deterministic state machine executed by a replica.
pub trait App
where
    Self: Send + 'static,
{
    fn execute(&mut self, op: &str) -> Vec<u8>;
}

/// Key-value store over `command:key:value` operations.
///
/// `put` and `delete` return the previous value, `get` the current one; an
/// absent key reads as empty.
#[derive(Debug, Clone, Default)]
pub struct KvStore(HashMap<String, String>);

impl App for KvStore {
    fn execute(&mut self, op: &str) -> Vec<u8> {
        let mut parts = op.splitn(3, ':');
        let (Some(command), Some(key)) = (parts.next(), parts.next()) else {
            return format!("error: malformed operation {op:?}").into_bytes();
        };
        let value = parts.next().unwrap_or_default();
        let result = match command {
            "put" => self.0.insert(key.into(), value.into()),
            "get" => self.0.get(key).cloned(),
            "delete" => self.0.remove(key),
            _ => return format!("error: unknown command {command}").into_bytes(),
        };
        result.unwrap_or_default().into_bytes()
    }
}
