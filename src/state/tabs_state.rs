//! TabsState - Dashboard Tab Selection

/// Tabs of the dashboard page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DashboardTab {
    /// Live metrics, chart and anomaly banner
    #[default]
    Dashboard,
    /// Historical samples and similarity search
    History,
    /// AI forecast
    Forecast,
}

impl DashboardTab {
    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Dashboard => "Dashboard",
            DashboardTab::History => "History",
            DashboardTab::Forecast => "Forecast",
        }
    }

    pub fn all() -> &'static [DashboardTab] {
        &[
            DashboardTab::Dashboard,
            DashboardTab::History,
            DashboardTab::Forecast,
        ]
    }

    /// Parse a tab name as typed by a user (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|tab| tab.title().eq_ignore_ascii_case(name.trim()))
    }
}

/// State for tab navigation
#[derive(Debug, Default)]
pub struct TabsState {
    active: DashboardTab,
}

impl TabsState {
    pub fn active(&self) -> DashboardTab {
        self.active
    }

    /// Select a tab, returning whether the selection changed
    pub fn select(&mut self, tab: DashboardTab) -> bool {
        if self.active == tab {
            return false;
        }
        self.active = tab;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_reports_changes() {
        let mut tabs = TabsState::default();
        assert_eq!(tabs.active(), DashboardTab::Dashboard);
        assert!(!tabs.select(DashboardTab::Dashboard));
        assert!(tabs.select(DashboardTab::History));
        assert_eq!(tabs.active(), DashboardTab::History);
    }

    #[test]
    fn test_parse() {
        assert_eq!(DashboardTab::parse(" history "), Some(DashboardTab::History));
        assert_eq!(DashboardTab::parse("FORECAST"), Some(DashboardTab::Forecast));
        assert_eq!(DashboardTab::parse("reports"), None);
    }
}
