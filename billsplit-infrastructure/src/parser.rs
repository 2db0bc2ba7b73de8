//! Turns raw recognized receipt text into a [`ParsedReceipt`] proposal.
//!
//! Receipt scans are noisy: full-width digits, `O`/`l` standing in for
//! `0`/`1` next to numbers, inconsistent whitespace. The text is normalized
//! first, then split into item rows and a grand total. The total is chosen
//! by scoring lines for total keywords and currency markers; everything
//! here is heuristic and the user corrects the proposal before accepting.

use billsplit_application::{ParsedReceipt, ReceiptReadError};
use billsplit_domain::{ItemDraft, Money};
use rust_decimal::Decimal;

pub fn parse_receipt_text(text: &str) -> Result<ParsedReceipt, ReceiptReadError> {
    let normalized = normalize_text(text);
    let candidates = extract_candidates(&normalized);
    let total = match select_total(&candidates) {
        Ok(candidate) => candidate,
        Err(TotalSelectionError::NotFound) => return Err(ReceiptReadError::TotalNotFound),
        Err(TotalSelectionError::Ambiguous) => return Err(ReceiptReadError::TotalAmbiguous),
    };

    let items: Vec<ItemDraft> = normalized
        .lines()
        .enumerate()
        .filter(|(index, line)| *index != total.line_index && !is_summary_line(line))
        .filter_map(|(_, line)| parse_item_line(line))
        .collect();
    if items.is_empty() {
        return Err(ReceiptReadError::NoItemsFound);
    }

    tracing::debug!(
        items = items.len(),
        total = %total.value,
        "parsed receipt text"
    );
    Ok(ParsedReceipt {
        items,
        total: Money::from_decimal(total.value),
    })
}

fn normalize_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();

    for (idx, c) in chars.iter().copied().enumerate() {
        let normalized = match c {
            '０'..='９' => char::from_u32((c as u32) - ('０' as u32) + ('0' as u32)).unwrap(),
            '，' => ',',
            '．' => '.',
            '￥' => '¥',
            '＄' => '$',
            '\t' | '\r' => ' ',
            '\u{000b}' | '\u{000c}' => ' ',
            'Ｏ' => 'O',
            'ｏ' => 'o',
            'ｌ' => 'l',
            'Ｉ' => 'I',
            _ => c,
        };

        // O and l are digit look-alikes only when touching a digit.
        let normalized =
            if matches!(normalized, 'O' | 'o' | 'I' | 'l') && is_adjacent_to_digit(&chars, idx) {
                match normalized {
                    'O' | 'o' => '0',
                    'I' | 'l' => '1',
                    _ => normalized,
                }
            } else {
                normalized
            };

        output.push(normalized);
    }

    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_adjacent_to_digit(chars: &[char], idx: usize) -> bool {
    let prev = idx.checked_sub(1).and_then(|i| chars.get(i)).copied();
    let next = chars.get(idx + 1).copied();
    prev.is_some_and(|c| c.is_ascii_digit()) || next.is_some_and(|c| c.is_ascii_digit())
}

#[derive(Clone, Copy)]
struct AmountCandidate {
    value: Decimal,
    line_index: usize,
    score: i32,
}

fn extract_candidates(text: &str) -> Vec<AmountCandidate> {
    let mut candidates = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let keyword_score = total_keyword_score(line);
        if keyword_score == 0 {
            continue;
        }
        let currency_bonus = if has_currency_marker(line) { 10 } else { 0 };
        let score = keyword_score + currency_bonus;

        for value in scan_amounts(line) {
            candidates.push(AmountCandidate {
                value,
                line_index,
                score,
            });
        }
    }

    candidates
}

fn total_keyword_score(line: &str) -> i32 {
    let upper = line.to_ascii_uppercase();
    if upper.contains("SUBTOTAL") || line.contains("小計") {
        return 0;
    }
    if line.contains("総合計") || line.contains("合計") || upper.contains("TOTAL") {
        100
    } else {
        0
    }
}

fn has_currency_marker(line: &str) -> bool {
    let upper = line.to_ascii_uppercase();
    line.contains('¥') || line.contains('$') || line.contains('円') || upper.contains("JPY")
}

/// Lines that describe the bill rather than a purchasable item.
fn is_summary_line(line: &str) -> bool {
    let upper = line.to_ascii_uppercase();
    ["SUBTOTAL", "TOTAL", "TAX", "TIP", "CASH", "CHANGE", "CARD", "DISCOUNT"]
        .iter()
        .any(|keyword| upper.contains(keyword))
        || ["小計", "合計", "税", "値引", "お釣", "現金"]
            .iter()
            .any(|keyword| line.contains(keyword))
}

fn scan_amounts(line: &str) -> Vec<Decimal> {
    let mut values = Vec::new();
    let mut buffer = String::new();

    for c in line.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() || c == ',' || c == '.' {
            buffer.push(c);
        } else if !buffer.is_empty() {
            if let Some(value) = parse_amount_token(&buffer) {
                values.push(value);
            }
            buffer.clear();
        }
    }

    values
}

fn parse_amount_token(token: &str) -> Option<Decimal> {
    let normalized = token.replace(',', "").trim_matches('.').to_string();
    normalized.parse::<Decimal>().ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TotalSelectionError {
    NotFound,
    Ambiguous,
}

fn select_total(candidates: &[AmountCandidate]) -> Result<AmountCandidate, TotalSelectionError> {
    if candidates.is_empty() {
        return Err(TotalSelectionError::NotFound);
    }

    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.line_index.cmp(&a.line_index))
            .then_with(|| b.value.cmp(&a.value))
    });

    // Two different amounts on the equally-best line cannot be told apart.
    let top = sorted[0];
    let ambiguous = sorted.iter().skip(1).any(|candidate| {
        candidate.score == top.score
            && candidate.line_index == top.line_index
            && candidate.value != top.value
    });
    if ambiguous {
        return Err(TotalSelectionError::Ambiguous);
    }

    Ok(top)
}

/// An item row: a name, an optional `xN` count marker, and a trailing price.
fn parse_item_line(line: &str) -> Option<ItemDraft> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&price_token, rest) = tokens.split_last()?;
    let price = parse_amount_token(price_token.trim_start_matches(['¥', '$']))?;
    if price.is_sign_negative() {
        return None;
    }

    let mut count = 1u32;
    let mut name_tokens = Vec::with_capacity(rest.len());
    for token in rest {
        if let Some(marker) = parse_count_marker(token) {
            count = marker;
        } else {
            name_tokens.push(*token);
        }
    }
    let name = name_tokens.join(" ");
    if name.is_empty() || !name.chars().any(char::is_alphabetic) {
        return None;
    }

    Some(ItemDraft {
        name,
        count,
        total_price: Money::from_decimal(price),
    })
}

/// Accepts `x2`, `×2`, `2x` and `2×` as a count marker token.
fn parse_count_marker(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix(['x', 'X', '×'])
        .or_else(|| token.strip_suffix(['x', 'X', '×']))?;
    let count = digits.parse::<u32>().ok()?;
    (count > 0).then_some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn normalizes_fullwidth_digits_and_confusables() {
        assert_eq!(normalize_text("１２３４５"), "12345");
        assert_eq!(normalize_text("1O0 円"), "100 円");
        assert_eq!(normalize_text("Olive Oil 500"), "Olive Oil 500");
    }

    #[test]
    fn parses_items_and_total() {
        let text = "Coffee x2 10.00\nBagel 3.00\nSubtotal 13.00\nTax 1.30\nTOTAL $14.30";
        let parsed = parse_receipt_text(text).expect("receipt parses");

        assert_eq!(parsed.total, Money::new(1430, 2));
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].name, "Coffee");
        assert_eq!(parsed.items[0].count, 2);
        assert_eq!(parsed.items[0].total_price, Money::new(1000, 2));
        assert_eq!(parsed.items[1].count, 1);
    }

    #[test]
    fn total_keyword_beats_larger_plain_number() {
        let text = "Wagyu 9999\n合計 ¥1000";
        let parsed = parse_receipt_text(text).expect("receipt parses");
        assert_eq!(parsed.total, Money::from_i64(1000));
    }

    #[test]
    fn subtotal_line_never_wins_the_total() {
        let text = "Coffee 800\n小計 800\n合計 880";
        let parsed = parse_receipt_text(text).expect("receipt parses");
        assert_eq!(parsed.total, Money::from_i64(880));
    }

    #[rstest]
    #[case::no_total("Coffee 500\nBagel 300")]
    #[case::empty("")]
    fn missing_total_is_an_error(#[case] text: &str) {
        assert!(matches!(
            parse_receipt_text(text),
            Err(ReceiptReadError::TotalNotFound)
        ));
    }

    #[test]
    fn conflicting_totals_on_one_line_are_ambiguous() {
        let text = "Coffee 500\nTOTAL 1000 1200";
        assert!(matches!(
            parse_receipt_text(text),
            Err(ReceiptReadError::TotalAmbiguous)
        ));
    }

    #[test]
    fn receipt_with_only_summary_lines_has_no_items() {
        let text = "Tax 1.30\nTOTAL 14.30";
        assert!(matches!(
            parse_receipt_text(text),
            Err(ReceiptReadError::NoItemsFound)
        ));
    }

    #[rstest]
    #[case::x_prefix("x3", Some(3))]
    #[case::x_suffix("3x", Some(3))]
    #[case::multiplication_sign("×2", Some(2))]
    #[case::zero_rejected("x0", None)]
    #[case::plain_word("extra", None)]
    fn count_markers(#[case] token: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_count_marker(token), expected);
    }
}
