use super::ui;
use crate::core::units::{self, Category, Scale};
use anyhow::Result;
use comfy_table::Cell;

pub fn display_category(category: Category) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Unit"),
        ui::header_cell("Name"),
        ui::header_cell("Factor"),
    ]);

    for unit in category.units() {
        let factor = match unit.scale {
            Scale::Linear(factor) => format!("{factor}"),
            Scale::Affine => "affine".to_string(),
        };
        table.add_row(vec![
            Cell::new(unit.code),
            Cell::new(unit.name),
            ui::number_cell(factor),
        ]);
    }

    format!(
        "{} ({})\n\n{}",
        ui::style_text(category.name(), ui::StyleType::Title),
        category.id(),
        table
    )
}

pub fn run(category: Option<&str>) -> Result<()> {
    let selected: Vec<Category> = match category {
        Some(name) => vec![name.parse()?],
        None => units::categories().to_vec(),
    };

    let output: Vec<String> = selected.into_iter().map(display_category).collect();
    println!("{}", output.join("\n\n"));
    Ok(())
}
