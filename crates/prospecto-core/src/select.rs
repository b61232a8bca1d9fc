use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub selected: bool,
}

// One dropdown's option list plus its selection set. The selected flag on
// each option and membership in `selected` are kept in agreement by every
// operation; the "all" aggregate is always recomputed, never stored.
#[derive(Debug, Clone)]
pub struct MultiSelect {
    options: Vec<SelectOption>,
    selected: BTreeSet<String>,
    search: String,
}

impl MultiSelect {
    pub fn new<I>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut options = Vec::new();
        let mut seen = BTreeSet::new();
        for (id, label) in entries {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(CoreError::EmptyOptionId);
            }
            if !seen.insert(id.clone()) {
                return Err(CoreError::DuplicateOptionId(id));
            }
            options.push(SelectOption {
                id,
                label,
                visible: true,
                selected: false,
            });
        }
        Ok(Self {
            options,
            selected: BTreeSet::new(),
            search: String::new(),
        })
    }

    pub fn toggle(&mut self, id: &str) {
        let Some(option) = self.options.iter_mut().find(|option| option.id == id) else {
            return;
        };
        if option.selected {
            option.selected = false;
            self.selected.remove(id);
        } else {
            option.selected = true;
            self.selected.insert(option.id.clone());
        }
    }

    pub fn toggle_all(&mut self) {
        if self.all_selected() {
            self.clear_selection();
        } else {
            for option in &mut self.options {
                if option.visible && !option.selected {
                    option.selected = true;
                    self.selected.insert(option.id.clone());
                }
            }
        }
    }

    pub fn remove(&mut self, id: &str) {
        if let Some(option) = self.options.iter_mut().find(|option| option.id == id) {
            option.selected = false;
        }
        self.selected.remove(id);
    }

    pub fn all_selected(&self) -> bool {
        let mut any_visible = false;
        for option in &self.options {
            if option.visible {
                any_visible = true;
                if !option.selected {
                    return false;
                }
            }
        }
        any_visible
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        let needle = term.trim().to_lowercase();
        for option in &mut self.options {
            option.visible = needle.is_empty() || option.label.to_lowercase().contains(&needle);
        }
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    // The aggregate row is hidden while a search term narrows the list.
    pub fn aggregate_visible(&self) -> bool {
        self.search.trim().is_empty()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn visible_options(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter().filter(|option| option.visible)
    }

    pub fn selected_in_order(&self) -> Vec<&SelectOption> {
        self.options
            .iter()
            .filter(|option| option.selected)
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected_in_order()
            .into_iter()
            .map(|option| option.id.clone())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        for option in &mut self.options {
            option.selected = false;
        }
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::MultiSelect;
    use crate::error::CoreError;

    fn projects() -> MultiSelect {
        MultiSelect::new(
            [
                ("parque-mirador", "Parque Mirador"),
                ("altos-del-valle", "Altos del Valle"),
                ("vista-cordillera", "Vista Cordillera"),
            ]
            .map(|(id, label)| (id.to_string(), label.to_string())),
        )
        .expect("valid options")
    }

    fn assert_in_sync(select: &MultiSelect) {
        for option in select.options() {
            assert_eq!(option.selected, select.contains(&option.id));
        }
    }

    #[test]
    fn new_rejects_empty_and_duplicate_ids() {
        let err = MultiSelect::new([(String::from("  "), String::from("x"))]).unwrap_err();
        assert_eq!(err, CoreError::EmptyOptionId);

        let err = MultiSelect::new(
            [("a", "A"), ("a", "B")].map(|(id, label)| (id.to_string(), label.to_string())),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::DuplicateOptionId("a".to_string()));
    }

    #[test]
    fn toggle_flips_membership_and_flag() {
        let mut select = projects();
        select.toggle("parque-mirador");
        assert!(select.contains("parque-mirador"));
        assert_eq!(select.selected_count(), 1);
        assert_in_sync(&select);

        select.toggle("parque-mirador");
        assert!(!select.contains("parque-mirador"));
        assert_eq!(select.selected_count(), 0);
        assert_in_sync(&select);
    }

    #[test]
    fn toggle_unknown_id_is_a_no_op() {
        let mut select = projects();
        select.toggle("nope");
        assert_eq!(select.selected_count(), 0);
        assert_in_sync(&select);
    }

    #[test]
    fn selecting_every_option_equals_toggle_all() {
        let mut one_by_one = projects();
        for id in ["parque-mirador", "altos-del-valle", "vista-cordillera"] {
            one_by_one.toggle(id);
        }
        let mut all_at_once = projects();
        all_at_once.toggle_all();

        assert!(one_by_one.all_selected());
        assert!(all_at_once.all_selected());
        assert_eq!(one_by_one.selected_ids(), all_at_once.selected_ids());
        assert_in_sync(&one_by_one);
        assert_in_sync(&all_at_once);
    }

    #[test]
    fn deselecting_any_option_clears_the_aggregate() {
        let mut select = projects();
        select.toggle_all();
        assert!(select.all_selected());

        select.toggle("altos-del-valle");
        assert!(!select.all_selected());
        assert_eq!(select.selected_count(), 2);
        assert_in_sync(&select);
    }

    #[test]
    fn toggle_all_when_aggregate_selected_clears_everything() {
        let mut select = projects();
        select.toggle_all();
        select.toggle_all();
        assert_eq!(select.selected_count(), 0);
        assert!(!select.all_selected());
        assert_in_sync(&select);
    }

    #[test]
    fn toggle_all_skips_hidden_options() {
        let mut select = projects();
        select.set_search("valle");
        select.toggle_all();
        assert_eq!(select.selected_ids(), vec!["altos-del-valle".to_string()]);

        select.clear_search();
        assert!(!select.all_selected());
        assert_in_sync(&select);
    }

    #[test]
    fn search_filters_labels_case_insensitively_and_hides_aggregate() {
        let mut select = projects();
        assert!(select.aggregate_visible());

        select.set_search("VALLE");
        assert!(!select.aggregate_visible());
        let visible: Vec<&str> = select
            .visible_options()
            .map(|option| option.id.as_str())
            .collect();
        assert_eq!(visible, vec!["altos-del-valle"]);

        select.clear_search();
        assert!(select.aggregate_visible());
        assert_eq!(select.visible_options().count(), 3);
    }

    #[test]
    fn remove_deselects_and_clears_the_aggregate() {
        let mut select = projects();
        select.toggle_all();

        select.remove("parque-mirador");
        assert!(!select.all_selected());
        assert!(!select.contains("parque-mirador"));
        assert_in_sync(&select);

        select.remove("altos-del-valle");
        select.remove("vista-cordillera");
        assert_eq!(select.selected_count(), 0);
        assert_in_sync(&select);
    }

    #[test]
    fn chips_render_in_option_list_order() {
        let mut select = projects();
        select.toggle("vista-cordillera");
        select.toggle("parque-mirador");
        assert_eq!(
            select.selected_ids(),
            vec!["parque-mirador".to_string(), "vista-cordillera".to_string()]
        );
    }

    #[test]
    fn all_selected_is_false_when_nothing_is_visible() {
        let mut select = projects();
        select.toggle_all();
        select.set_search("zzz");
        assert!(!select.all_selected());
    }
}
