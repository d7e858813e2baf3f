use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use layerforge::api::{LayoutReport, PreparedSearch};

/// Layout text with a space between layers.
fn split_layers(layout: &str, per_layer: usize) -> String {
    let chars: Vec<char> = layout.chars().collect();
    chars
        .chunks(per_layer.max(1))
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_letter_sets(prepared: &PreparedSearch) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Layer").add_attribute(Attribute::Bold),
        Cell::new("Letters"),
    ]);

    for i in 0..prepared.letters.layers.len() {
        table.add_row(vec![
            Cell::new(format!("{}", i + 1)),
            Cell::new(prepared.letters.layer_string(i)),
        ]);
    }

    let swap = &prepared.letters.swap_zone;
    if !swap.is_empty() {
        let half = swap.len().div_ceil(2);
        let (first, second) = swap.split_at(half);
        table.add_row(vec![
            Cell::new("Swap").fg(Color::Yellow),
            Cell::new(format!(
                "{} <-> {}",
                first.iter().collect::<String>(),
                second.iter().collect::<String>()
            )),
        ]);
    }

    let pins: Vec<String> = prepared
        .pins
        .slots
        .iter()
        .enumerate()
        .filter_map(|(slot, pin)| pin.map(|c| format!("{}:{}", slot, c)))
        .collect();
    if !pins.is_empty() {
        table.add_row(vec![
            Cell::new("Pinned").fg(Color::Cyan),
            Cell::new(pins.join(", ")),
        ]);
    }
    println!("{}", table);
}

pub fn print_layout_grid(name: &str, layout: &str, per_layer: usize) {
    println!("\nLayout: {}", name);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let chars: Vec<char> = layout.chars().collect();
    for chunk in chars.chunks(per_layer.max(1)) {
        let cells: Vec<Cell> = chunk
            .iter()
            .map(|c| Cell::new(c.to_string()).set_alignment(CellAlignment::Center))
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

/// Ranked layouts, best first.
pub fn print_ranking(reports: &[LayoutReport], per_layer: usize) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Layout").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
    ];
    if let Some(first) = reports.first() {
        for c in &first.per_corpus {
            header.push(Cell::new(format!("{} {}%", c.name, c.weight)));
        }
    }
    header.push(Cell::new("Writable").fg(Color::Green));
    table.set_header(header);

    for (rank, r) in reports.iter().enumerate() {
        let mut row = vec![
            Cell::new(rank + 1),
            Cell::new(split_layers(&r.layout, per_layer)),
            Cell::new(format!("{:.4}", r.score)).set_alignment(CellAlignment::Right),
        ];
        for c in &r.per_corpus {
            row.push(Cell::new(format!("{:.4}", c.score)).set_alignment(CellAlignment::Right));
        }
        row.push(
            Cell::new(format!("{:.2}%", r.writable_mass * 100.0))
                .set_alignment(CellAlignment::Right),
        );
        table.add_row(row);
    }
    println!("{}", table);
}
