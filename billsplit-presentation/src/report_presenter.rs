use std::borrow::Cow;

use billsplit_domain::{Money, ParticipantReport, Report};

use crate::text_table::{Alignment, TextTableBuilder};

/// Display-only currency formatting. Stored amounts keep full precision;
/// only what the user sees is rounded to `scale` fractional digits.
#[derive(Clone, Debug)]
pub struct CurrencyFormat {
    pub symbol: Cow<'static, str>,
    pub scale: u32,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<Cow<'static, str>>, scale: u32) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
        }
    }

    pub fn usd() -> Self {
        Self::new("$", 2)
    }

    pub fn jpy() -> Self {
        Self::new("¥", 0)
    }

    pub fn format(&self, amount: Money) -> String {
        let rounded = amount.as_decimal().round_dp(self.scale);
        format!("{}{:.*}", self.symbol, self.scale as usize, rounded)
    }
}

pub struct ReportPresenter;

pub struct ReportView {
    pub participant_sections: Vec<ParticipantSection>,
    pub summary_table: String,
}

pub struct ParticipantSection {
    pub name: String,
    pub table: String,
}

impl ReportPresenter {
    /// Renders one table per participant plus a who-owes-what summary.
    pub fn render(report: &Report, currency: &CurrencyFormat) -> ReportView {
        let participant_sections = report
            .rows
            .iter()
            .map(|row| ParticipantSection {
                name: row.name.clone(),
                table: Self::build_participant_table(row, currency),
            })
            .collect();

        ReportView {
            participant_sections,
            summary_table: Self::build_summary_table(report, currency),
        }
    }

    pub fn build_participant_table(row: &ParticipantReport, currency: &CurrencyFormat) -> String {
        const HEADERS: [Cow<'static, str>; 4] = [
            Cow::Borrowed("Item"),
            Cow::Borrowed("Qty"),
            Cow::Borrowed("Unit"),
            Cow::Borrowed("Total"),
        ];

        TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&HEADERS)
            .rows(row.purchased_items.iter().map(|item| {
                [
                    Cow::Borrowed(item.name.as_str()),
                    Cow::Owned(item.purchased_count.to_string()),
                    Cow::Owned(currency.format(item.unit_price)),
                    Cow::Owned(currency.format(item.total)),
                ]
            }))
            .row([
                Cow::Borrowed("Subtotal"),
                Cow::Borrowed(""),
                Cow::Borrowed(""),
                Cow::Owned(currency.format(row.purchased_subtotal)),
            ])
            .row([
                Cow::Borrowed("Shared charges"),
                Cow::Borrowed(""),
                Cow::Borrowed(""),
                Cow::Owned(currency.format(row.purchased_others())),
            ])
            .row([
                Cow::Borrowed("Owes"),
                Cow::Borrowed(""),
                Cow::Borrowed(""),
                Cow::Owned(currency.format(row.purchased_total)),
            ])
            .build()
    }

    pub fn build_summary_table(report: &Report, currency: &CurrencyFormat) -> String {
        const HEADERS: [Cow<'static, str>; 2] =
            [Cow::Borrowed("Participant"), Cow::Borrowed("Owes")];

        let mut rows: Vec<[Cow<'_, str>; 2]> = report
            .rows
            .iter()
            .map(|row| {
                [
                    Cow::Borrowed(row.name.as_str()),
                    Cow::Owned(currency.format(row.purchased_total)),
                ]
            })
            .collect();
        if !report.unclaimed_subtotal.is_zero() {
            rows.push([
                Cow::Borrowed("(unclaimed items)"),
                Cow::Owned(currency.format(report.unclaimed_subtotal)),
            ]);
        }
        rows.push([
            Cow::Borrowed("Order total"),
            Cow::Owned(currency.format(report.order_total)),
        ]);

        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&HEADERS)
            .rows(rows)
            .build()
    }
}
