//! /usage command - remaining conversions and plan state

use utsusu_core::{Session, UsageSummary};

pub struct UsageCommand;

impl UsageCommand {
    pub fn execute(session: &Session) -> String {
        let gate = session.gate();
        let limits = gate.limits();

        let mut output = String::from("Usage\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "Plan:        {}\n",
            if gate.is_paid() { "月額プラン" } else { "お試し" }
        ));
        output.push_str(&format!("Converted:   {}\n", gate.usage_count()));
        output.push_str(&format!("Free limit:  {}\n", limits.free_limit));
        output.push_str(&format!("Status:      {}", gate.summary().label()));
        if gate.summary() == UsageSummary::TrialUsed {
            output.push_str("\n\n/upgrade でプランを確認できます");
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fast_session;

    #[test]
    fn test_fresh_session_shows_trial() {
        let text = UsageCommand::execute(&fast_session(1));
        assert!(text.contains("お試し 1 回"));
        assert!(!text.contains("/upgrade"));
    }

    #[tokio::test]
    async fn test_used_trial_points_to_upgrade() {
        let mut session = fast_session(1);
        session
            .submit("https://youtu.be/a", Default::default())
            .await
            .unwrap();
        let text = UsageCommand::execute(&session);
        assert!(text.contains("プランに登録"));
        assert!(text.contains("/upgrade"));
    }
}
