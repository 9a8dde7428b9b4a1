//! Text and JSON renderings of the category table.

use serde::Serialize;
use sorter_core::CategoryTable;

#[derive(Debug, Clone, Serialize)]
pub struct CountRow {
    pub id: &'static str,
    pub name: String,
    pub count: usize,
    pub selected: bool,
}

pub fn rows(table: &CategoryTable) -> Vec<CountRow> {
    table
        .categories()
        .iter()
        .map(|c| CountRow {
            id: c.id.as_str(),
            name: c.display_name.clone(),
            count: c.member_count,
            selected: c.selected,
        })
        .collect()
}

pub fn counts_json(table: &CategoryTable) -> serde_json::Value {
    serde_json::json!({
        "total": table.total(),
        "selected_total": table.selected_sample_count(),
        "categories": rows(table),
    })
}

pub fn counts_text(table: &CategoryTable) -> String {
    let mut out = String::new();
    for row in rows(table) {
        let mark = if row.selected { "x" } else { " " };
        out.push_str(&format!("[{}] {:<14} {:>6}\n", mark, row.name, row.count));
    }
    out.push_str(&format!(
        "total {}, selected {}\n",
        table.total(),
        table.selected_sample_count()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorter_core::CategoryId;

    #[test]
    fn text_marks_unselected_categories() {
        let mut table = CategoryTable::new();
        table.toggle(CategoryId::Sfx);
        let text = counts_text(&table);
        assert!(text.contains("[x] Kicks"));
        assert!(text.contains("[ ] SFX"));
        assert!(text.ends_with("total 0, selected 0\n"));
    }

    #[test]
    fn json_lists_all_categories_in_order() {
        let value = counts_json(&CategoryTable::new());
        let ids: Vec<&str> = value["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["kicks", "snares", "hihats", "percussion", "bass", "sfx", "vocals", "other"]
        );
        assert_eq!(value["total"], 0);
    }
}
