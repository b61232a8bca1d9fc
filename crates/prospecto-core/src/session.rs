use std::collections::BTreeSet;

use crate::domain::{name, phone, rut, Lead};
use crate::error::CoreError;
use crate::rules::{validate, Draft, Field};
use crate::select::MultiSelect;

// Owns all mutable form state. Text fields hold the displayed (formatted)
// values; edits go through the formatters and hand back the remapped cursor.
#[derive(Debug, Clone)]
pub struct FormSession {
    name: String,
    rut: String,
    phone: String,
    email: String,
    prefix: String,
    default_prefix: String,
    terms_accepted: bool,
    projects: MultiSelect,
    unit_types: MultiSelect,
    last_phone_formatted: String,
    errors: BTreeSet<Field>,
}

impl FormSession {
    pub fn new(
        projects: MultiSelect,
        unit_types: MultiSelect,
        default_prefix: &str,
    ) -> Result<Self, CoreError> {
        let prefix = phone::normalize_prefix(default_prefix)?;
        Ok(Self {
            name: String::new(),
            rut: String::new(),
            phone: String::new(),
            email: String::new(),
            prefix: prefix.clone(),
            default_prefix: prefix,
            terms_accepted: false,
            projects,
            unit_types,
            last_phone_formatted: String::new(),
            errors: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rut(&self) -> &str {
        &self.rut
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn projects(&self) -> &MultiSelect {
        &self.projects
    }

    pub fn unit_types(&self) -> &MultiSelect {
        &self.unit_types
    }

    pub fn edit_name(&mut self, raw: &str, cursor: usize) -> usize {
        let (value, cursor) = name::sanitize_with_cursor(raw, cursor);
        self.name = value;
        self.errors.remove(&Field::Name);
        cursor
    }

    pub fn edit_rut(&mut self, raw: &str, cursor: usize) -> usize {
        let outcome = rut::apply_edit(&self.rut, raw, cursor);
        self.rut = outcome.value;
        self.errors.remove(&Field::Rut);
        outcome.cursor
    }

    // Re-render only when the formatted text differs from both the raw input
    // and the last value this formatter produced; otherwise the raw text
    // stands. The memo breaks the reformat feedback loop.
    pub fn edit_phone(&mut self, raw: &str, cursor: usize) -> usize {
        self.errors.remove(&Field::Phone);
        let formatted = phone::format(raw);
        if formatted != raw && formatted != self.last_phone_formatted {
            let cursor = phone::remap_cursor(cursor, &formatted);
            self.last_phone_formatted = formatted.clone();
            self.phone = formatted;
            cursor
        } else {
            self.phone = raw.to_string();
            cursor.min(raw.chars().count())
        }
    }

    pub fn edit_email(&mut self, raw: &str, cursor: usize) -> usize {
        self.email = raw.to_string();
        self.errors.remove(&Field::Email);
        cursor.min(raw.chars().count())
    }

    pub fn set_prefix(&mut self, prefix: &str) -> Result<(), CoreError> {
        self.prefix = phone::normalize_prefix(prefix)?;
        self.errors.remove(&Field::Phone);
        Ok(())
    }

    pub fn set_terms(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
        self.errors.remove(&Field::Terms);
    }

    pub fn toggle_project(&mut self, id: &str) {
        self.projects.toggle(id);
        self.errors.remove(&Field::Projects);
    }

    pub fn toggle_all_projects(&mut self) {
        self.projects.toggle_all();
        self.errors.remove(&Field::Projects);
    }

    pub fn remove_project(&mut self, id: &str) {
        self.projects.remove(id);
        self.errors.remove(&Field::Projects);
    }

    pub fn search_projects(&mut self, term: &str) {
        self.projects.set_search(term);
        self.errors.remove(&Field::Projects);
    }

    pub fn toggle_unit_type(&mut self, id: &str) {
        self.unit_types.toggle(id);
        self.errors.remove(&Field::UnitTypes);
    }

    pub fn toggle_all_unit_types(&mut self) {
        self.unit_types.toggle_all();
        self.errors.remove(&Field::UnitTypes);
    }

    pub fn remove_unit_type(&mut self, id: &str) {
        self.unit_types.remove(id);
        self.errors.remove(&Field::UnitTypes);
    }

    pub fn unit_types_visible(&self) -> bool {
        self.projects.selected_count() > 0
    }

    pub fn full_phone(&self) -> Option<String> {
        phone::full_number(&self.prefix, &self.phone)
    }

    pub fn field_error(&self, field: Field) -> bool {
        self.errors.contains(&field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn submit(&mut self, now: i64) -> Result<Lead, BTreeSet<Field>> {
        let failed = validate(&Draft {
            name: &self.name,
            rut: &self.rut,
            phone: &self.phone,
            email: &self.email,
            projects_selected: self.projects.selected_count(),
            unit_types_visible: self.unit_types_visible(),
            unit_types_selected: self.unit_types.selected_count(),
            terms_accepted: self.terms_accepted,
        });
        if !failed.is_empty() {
            self.errors = failed.clone();
            return Err(failed);
        }

        let Some(full_phone) = self.full_phone() else {
            self.errors.insert(Field::Phone);
            return Err(self.errors.clone());
        };

        let lead = Lead {
            name: self.name.trim().to_string(),
            rut: self.rut.clone(),
            email: self.email.trim().to_string(),
            full_phone,
            projects: self.projects.selected_ids(),
            unit_types: self.unit_types.selected_ids(),
            submitted_at: now,
        };
        self.reset();
        Ok(lead)
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.rut.clear();
        self.phone.clear();
        self.email.clear();
        self.prefix = self.default_prefix.clone();
        self.terms_accepted = false;
        self.projects.clear_selection();
        self.projects.clear_search();
        self.unit_types.clear_selection();
        self.last_phone_formatted.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::FormSession;
    use crate::rules::Field;
    use crate::select::MultiSelect;

    fn options(entries: &[(&str, &str)]) -> MultiSelect {
        MultiSelect::new(
            entries
                .iter()
                .map(|(id, label)| (id.to_string(), label.to_string())),
        )
        .expect("valid options")
    }

    fn session() -> FormSession {
        FormSession::new(
            options(&[("parque-mirador", "Parque Mirador"), ("altos", "Altos")]),
            options(&[("studio", "Studio"), ("2d1b", "2 dormitorios 1 baño")]),
            "569",
        )
        .expect("valid session")
    }

    fn type_into_rut(session: &mut FormSession, text: &str) -> usize {
        let mut cursor = 0;
        for ch in text.chars() {
            let mut raw: Vec<char> = session.rut().chars().collect();
            raw.insert(cursor, ch);
            let raw: String = raw.into_iter().collect();
            cursor = session.edit_rut(&raw, cursor + 1);
        }
        cursor
    }

    fn type_into_phone(session: &mut FormSession, text: &str) -> usize {
        let mut cursor = 0;
        for ch in text.chars() {
            let mut raw: Vec<char> = session.phone().chars().collect();
            raw.insert(cursor, ch);
            let raw: String = raw.into_iter().collect();
            cursor = session.edit_phone(&raw, cursor + 1);
        }
        cursor
    }

    #[test]
    fn typing_a_full_rut_formats_incrementally() {
        let mut session = session();
        let cursor = type_into_rut(&mut session, "196789055");
        assert_eq!(session.rut(), "19.678.905-5");
        assert_eq!(cursor, 12);
    }

    #[test]
    fn rut_rejects_the_tenth_significant_character() {
        let mut session = session();
        type_into_rut(&mut session, "196789055");
        let before = session.rut().to_string();

        let mut raw = before.clone();
        raw.push('9');
        let cursor = session.edit_rut(&raw, raw.len());
        assert_eq!(session.rut(), before);
        assert_eq!(cursor, before.len());
    }

    #[test]
    fn typing_a_full_phone_formats_incrementally() {
        let mut session = session();
        let cursor = type_into_phone(&mut session, "98887766");
        assert_eq!(session.phone(), "9888 7766");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn phone_memo_skips_rerender_when_format_matches_last() {
        let mut session = session();
        type_into_phone(&mut session, "98887");
        assert_eq!(session.phone(), "9888 7");

        // Deleting the space yields text that formats straight back to the
        // memoized value, so the raw text stands rather than re-rendering.
        let cursor = session.edit_phone("98887", 4);
        assert_eq!(session.phone(), "98887");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn phone_stray_letter_is_dropped_by_reformat() {
        let mut session = session();
        type_into_phone(&mut session, "98887766");

        let cursor = session.edit_phone("9888 7766a", 10);
        assert_eq!(session.phone(), "9888 7766");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn name_edits_are_filtered() {
        let mut session = session();
        let cursor = session.edit_name("Ana3 Pérez", 4);
        assert_eq!(session.name(), "Ana Pérez");
        assert_eq!(cursor, 3);
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let mut session = session();
        assert!(session.submit(0).is_err());
        assert!(session.field_error(Field::Name));
        assert!(session.field_error(Field::Rut));

        session.edit_name("Ana", 3);
        assert!(!session.field_error(Field::Name));
        assert!(session.field_error(Field::Rut));
    }

    #[test]
    fn unit_types_dropdown_follows_project_selection() {
        let mut session = session();
        assert!(!session.unit_types_visible());

        session.toggle_project("parque-mirador");
        assert!(session.unit_types_visible());

        session.remove_project("parque-mirador");
        assert!(!session.unit_types_visible());
    }

    #[test]
    fn submit_with_valid_fields_returns_lead_and_resets() {
        let mut session = session();
        session.edit_name("Ana Pérez", 0);
        type_into_rut(&mut session, "196789055");
        type_into_phone(&mut session, "98887766");
        session.edit_email("a@b.cl", 0);
        session.toggle_project("parque-mirador");
        session.toggle_unit_type("studio");
        session.set_terms(true);

        let lead = session.submit(1_700_000_000).expect("valid submission");
        assert_eq!(lead.name, "Ana Pérez");
        assert_eq!(lead.rut, "19.678.905-5");
        assert_eq!(lead.full_phone, "56998887766");
        assert_eq!(lead.projects, vec!["parque-mirador".to_string()]);
        assert_eq!(lead.unit_types, vec!["studio".to_string()]);
        assert_eq!(lead.submitted_at, 1_700_000_000);

        assert_eq!(session.name(), "");
        assert_eq!(session.rut(), "");
        assert_eq!(session.phone(), "");
        assert_eq!(session.email(), "");
        assert!(!session.terms_accepted());
        assert_eq!(session.projects().selected_count(), 0);
        assert_eq!(session.unit_types().selected_count(), 0);
        assert!(!session.has_errors());
    }

    #[test]
    fn submit_with_bad_email_marks_only_email() {
        let mut session = session();
        session.edit_name("Ana Pérez", 0);
        type_into_rut(&mut session, "196789055");
        type_into_phone(&mut session, "98887766");
        session.edit_email("not-an-email", 0);
        session.toggle_project("parque-mirador");
        session.toggle_unit_type("studio");
        session.set_terms(true);

        let failed = session.submit(0).unwrap_err();
        assert_eq!(failed.into_iter().collect::<Vec<_>>(), vec![Field::Email]);
        assert_eq!(session.email(), "not-an-email");
        assert_eq!(session.rut(), "19.678.905-5");
    }

    #[test]
    fn prefix_resets_to_default_after_submit() {
        let mut session = session();
        session.set_prefix("562").expect("valid prefix");
        assert_eq!(session.prefix(), "562");

        session.edit_name("Ana", 0);
        type_into_rut(&mut session, "196789055");
        type_into_phone(&mut session, "98887766");
        session.edit_email("a@b.cl", 0);
        session.toggle_project("altos");
        session.toggle_unit_type("studio");
        session.set_terms(true);
        let lead = session.submit(0).expect("valid submission");
        assert_eq!(lead.full_phone, "56298887766");
        assert_eq!(session.prefix(), "569");
    }
}
