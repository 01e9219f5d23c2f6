use chrono::Utc;

use crate::models::{Campaign, CampaignPatch};

/// Applies a partial patch and refreshes `updated_at`.
pub(super) fn patch(campaign: &mut Campaign, patch: CampaignPatch) {
    if let Some(name) = patch.name {
        campaign.name = name;
    }
    if let Some(short_code) = patch.short_code {
        campaign.short_code = short_code;
    }
    if let Some(location) = patch.location {
        campaign.location = location;
    }
    if let Some(status) = patch.status {
        campaign.status = status;
    }
    if let Some(style_tags) = patch.style_tags {
        campaign.style_tags = style_tags;
    }
    if let Some(content_warnings) = patch.content_warnings {
        campaign.content_warnings = content_warnings;
    }
    if let Some(default_rules) = patch.default_rules {
        campaign.default_rules = default_rules;
    }
    if let Some(next_mission_id) = patch.next_mission_id {
        campaign.next_mission_id = next_mission_id;
    }
    if let Some(duty_manager) = patch.duty_manager {
        campaign.duty_manager = duty_manager;
    }
    campaign.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CampaignStatus;

    #[test]
    fn patch_applies_only_given_fields_and_refreshes_timestamp() {
        let mut campaign = Campaign::first_run();
        let before = campaign.updated_at;

        patch(
            &mut campaign,
            CampaignPatch {
                name: Some("Section Nine".to_string()),
                status: Some(CampaignStatus::Paused),
                duty_manager: Some(Some("DM on call".to_string())),
                ..Default::default()
            },
        );

        assert_eq!(campaign.name, "Section Nine");
        assert_eq!(campaign.status, CampaignStatus::Paused);
        assert_eq!(campaign.duty_manager.as_deref(), Some("DM on call"));
        assert_eq!(campaign.short_code, "HQ-01");
        assert!(campaign.updated_at >= before);
    }

    #[test]
    fn doubled_option_clears_nullable_fields() {
        let mut campaign = Campaign::first_run();
        campaign.duty_manager = Some("someone".to_string());

        patch(
            &mut campaign,
            CampaignPatch {
                duty_manager: Some(None),
                ..Default::default()
            },
        );

        assert!(campaign.duty_manager.is_none());
    }
}
