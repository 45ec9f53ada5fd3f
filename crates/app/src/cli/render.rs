use elancart::pricing::{OrderAmounts, format_amount};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

/// Render `rows` under `header`, right-aligning the columns in `numeric`.
pub(crate) fn table<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
    numeric: std::ops::Range<usize>,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    table.to_string()
}

pub(crate) fn amounts(amounts: &OrderAmounts) -> String {
    let mut rows = vec![
        ["Subtotal".to_string(), format_amount(amounts.subtotal)],
        ["Shipping".to_string(), shipping(amounts)],
    ];

    if !amounts.cod_fee.is_zero() {
        rows.push(["COD fee".to_string(), format_amount(amounts.cod_fee)]);
    }

    rows.push(["Tax (8%)".to_string(), format_amount(amounts.tax)]);
    rows.push(["Total".to_string(), format_amount(amounts.total)]);

    table(["", "Amount"], rows, 1..2)
}

fn shipping(amounts: &OrderAmounts) -> String {
    if amounts.shipping.is_zero() {
        "FREE".to_string()
    } else {
        format_amount(amounts.shipping)
    }
}
