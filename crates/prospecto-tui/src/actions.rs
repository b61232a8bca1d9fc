use std::time::Instant;

use anyhow::Result;
use prospecto_core::domain::Lead;
use prospecto_core::time::format_timestamp_datetime;

use crate::app::App;

#[derive(Debug, Clone)]
pub enum Action {
    LeadCaptured(Lead),
}

// The run loop drains the queue before every draw. There is no backend; a
// captured lead goes to the diagnostic channel only.
pub fn execute_action(app: &mut App, action: Action) -> Result<()> {
    match action {
        Action::LeadCaptured(lead) => {
            let payload = serde_json::to_string(&lead)?;
            tracing::info!(
                target: "prospecto::lead",
                full_phone = %lead.full_phone,
                submitted_at = %format_timestamp_datetime(lead.submitted_at),
                %payload,
                "lead captured"
            );
            app.lead_captured(Instant::now());
        }
    }
    Ok(())
}
