use crate::models::AppSettings;

pub(super) fn set_notes_allow_html(settings: &mut AppSettings, allow: bool) {
    settings.notes_allow_html = Some(allow);
}
