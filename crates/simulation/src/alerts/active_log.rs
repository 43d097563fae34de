use super::{Alert, AlertSeverity};

/// Maximum number of alerts retained in the active log.
pub const MAX_ACTIVE_ALERTS: usize = 200;

/// Alerts raised since the last explicit clear, oldest first.
///
/// Independent of the session window: clearing this log never touches
/// recorded history.
#[derive(Debug, Default, Clone)]
pub struct ActiveAlertLog {
    alerts: Vec<Alert>,
}

impl ActiveAlertLog {
    /// Push a new alert, evicting the oldest if the log is full.
    pub fn push(&mut self, alert: Alert) {
        if self.alerts.len() >= MAX_ACTIVE_ALERTS {
            self.alerts.remove(0);
        }
        self.alerts.push(alert);
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.last()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Return all alerts of a given severity.
    pub fn alerts_of_severity(&self, severity: AlertSeverity) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| a.severity == severity).collect()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleRef;
    use crate::time_of_day::SimTimestamp;

    fn alert(id: u64, severity: AlertSeverity) -> Alert {
        Alert {
            id,
            timestamp: SimTimestamp(id),
            junction_id: "J-1".to_string(),
            severity,
            message: String::new(),
            source_sample_ref: SampleRef {
                junction_id: "J-1".to_string(),
                tick: id,
            },
        }
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = ActiveAlertLog::default();
        for id in 0..(MAX_ACTIVE_ALERTS as u64 + 25) {
            log.push(alert(id, AlertSeverity::Medium));
        }
        assert_eq!(log.len(), MAX_ACTIVE_ALERTS);
        assert_eq!(log.alerts()[0].id, 25, "oldest alerts should be evicted first");
        assert_eq!(log.latest().map(|a| a.id), Some(MAX_ACTIVE_ALERTS as u64 + 24));
    }

    #[test]
    fn test_filter_and_clear() {
        let mut log = ActiveAlertLog::default();
        log.push(alert(1, AlertSeverity::High));
        log.push(alert(2, AlertSeverity::Medium));
        log.push(alert(3, AlertSeverity::High));
        assert_eq!(log.alerts_of_severity(AlertSeverity::High).len(), 2);
        assert!(log.alerts_of_severity(AlertSeverity::Low).is_empty());

        log.clear();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
