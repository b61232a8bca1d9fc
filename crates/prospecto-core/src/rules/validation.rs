use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{email, phone, rut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Rut,
    Phone,
    Email,
    Projects,
    UnitTypes,
    Terms,
}

#[derive(Debug, Clone, Default)]
pub struct Draft<'a> {
    pub name: &'a str,
    pub rut: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub projects_selected: usize,
    pub unit_types_visible: bool,
    pub unit_types_selected: usize,
    pub terms_accepted: bool,
}

// All checks run; failures accumulate so the operator sees every problem at
// once.
pub fn validate(draft: &Draft<'_>) -> BTreeSet<Field> {
    let mut failed = BTreeSet::new();
    if draft.name.trim().is_empty() {
        failed.insert(Field::Name);
    }
    if !rut::validate(draft.rut) {
        failed.insert(Field::Rut);
    }
    if !phone::is_complete(draft.phone) {
        failed.insert(Field::Phone);
    }
    if !email::is_valid(draft.email) {
        failed.insert(Field::Email);
    }
    if draft.projects_selected == 0 {
        failed.insert(Field::Projects);
    }
    if draft.unit_types_visible && draft.unit_types_selected == 0 {
        failed.insert(Field::UnitTypes);
    }
    if !draft.terms_accepted {
        failed.insert(Field::Terms);
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::{validate, Draft, Field};

    fn valid_draft() -> Draft<'static> {
        Draft {
            name: "Ana Pérez",
            rut: "19.678.905-5",
            phone: "9888 7766",
            email: "a@b.cl",
            projects_selected: 1,
            unit_types_visible: true,
            unit_types_selected: 1,
            terms_accepted: true,
        }
    }

    #[test]
    fn valid_draft_passes_every_check() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn failures_accumulate_instead_of_short_circuiting() {
        let failed = validate(&Draft::default());
        assert_eq!(failed.len(), 6);
        assert!(!failed.contains(&Field::UnitTypes));
    }

    #[test]
    fn bad_email_marks_only_the_email_field() {
        let mut draft = valid_draft();
        draft.email = "not-an-email";
        let failed = validate(&draft);
        assert_eq!(failed.into_iter().collect::<Vec<_>>(), vec![Field::Email]);
    }

    #[test]
    fn whitespace_only_name_fails() {
        let mut draft = valid_draft();
        draft.name = "   ";
        assert!(validate(&draft).contains(&Field::Name));
    }

    #[test]
    fn unit_types_only_required_while_visible() {
        let mut draft = valid_draft();
        draft.unit_types_selected = 0;
        assert!(validate(&draft).contains(&Field::UnitTypes));

        draft.unit_types_visible = false;
        assert!(!validate(&draft).contains(&Field::UnitTypes));
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut draft = valid_draft();
        draft.terms_accepted = false;
        assert_eq!(
            validate(&draft).into_iter().collect::<Vec<_>>(),
            vec![Field::Terms]
        );
    }
}
