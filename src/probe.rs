//! Runtime probe: the `__probe` built-in records tagged, timestamped
//! snapshots of values so tests can inspect execution without touching
//! program output.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::exec::value::Value;

#[derive(Debug, Clone)]
pub struct ProbeLog {
    pub probe_time: SystemTime,
    pub value_str: String,
    pub value_type: &'static str,
}

#[derive(Debug, Default)]
pub struct Probe {
    info: HashMap<String, Vec<ProbeLog>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_log(&mut self, tag: &str, value: &Value) {
        let log = ProbeLog {
            probe_time: SystemTime::now(),
            value_str: value.display_string(),
            value_type: value.type_name(),
        };
        self.info.entry(tag.to_string()).or_default().push(log);
    }

    /// All entries recorded under a tag, oldest first.
    pub fn get_log(&self, tag: &str) -> &[ProbeLog] {
        self.info.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_display_string_and_type() {
        let mut probe = Probe::new();
        probe.add_log("$K", &Value::Str("甲".to_string()));
        probe.add_log("$K", &Value::Bool(true));

        let logs = probe.get_log("$K");
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].value_str, "「甲」");
        assert_eq!(logs[0].value_type, "string");
        assert_eq!(logs[1].value_str, "真");
        assert!(probe.get_log("missing").is_empty());
    }
}
