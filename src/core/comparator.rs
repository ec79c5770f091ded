/*
 * Deterministic ordering policy for sibling nodes. Siblings sort in three
 * tiers: filesystem roots first, then items without a real filesystem path,
 * then items with one. Within the root tier the compare is case-insensitive
 * on the parsing name; within the other tiers it is a natural or plain
 * case-insensitive compare of display names, selected by configuration.
 *
 * The order is total: ties fall through to the parsing path and finally the
 * exact display name, so two distinct siblings never compare equal unless
 * their filesystem paths are identical.
 */
use super::models::SortKey;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

pub fn compare_siblings(a: &SortKey, b: &SortKey, use_natural_sort: bool) -> Ordering {
    match (a.is_filesystem_root, b.is_filesystem_root) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => caseless_compare(&root_sort_name(a), &root_sort_name(b))
            .then_with(|| total_order_tie_break(a, b)),
        (false, false) => match (a.parsing_path.is_some(), b.parsing_path.is_some()) {
            // Virtual-only items sort ahead of items with a real path.
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => {
                let by_name = if use_natural_sort {
                    natural_compare(&a.display_name, &b.display_name)
                } else {
                    caseless_compare(&a.display_name, &b.display_name)
                };
                by_name.then_with(|| total_order_tie_break(a, b))
            }
        },
    }
}

fn root_sort_name(key: &SortKey) -> Cow<'_, str> {
    match &key.parsing_path {
        Some(path) => path.to_string_lossy(),
        None => Cow::from(key.display_name.as_str()),
    }
}

fn total_order_tie_break(a: &SortKey, b: &SortKey) -> Ordering {
    a.parsing_path
        .cmp(&b.parsing_path)
        .then_with(|| a.display_name.cmp(&b.display_name))
}

fn caseless_compare(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().flat_map(char::to_lowercase);
    let mut b_chars = b.chars().flat_map(char::to_lowercase);
    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/*
 * Case-insensitive compare that orders embedded unsigned integer runs by
 * numeric value, so "file2" sorts before "file10". Equal numeric values
 * with different zero padding stay distinct (fewer leading zeros first).
 */
fn natural_compare(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();
    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let x_run = take_digit_run(&mut a_chars);
                    let y_run = take_digit_run(&mut b_chars);
                    let order = compare_digit_runs(&x_run, &y_run);
                    if order != Ordering::Equal {
                        return order;
                    }
                } else {
                    let xl = lowered(x);
                    let yl = lowered(y);
                    if xl != yl {
                        return xl.cmp(&yl);
                    }
                    a_chars.next();
                    b_chars.next();
                }
            }
        }
    }
}

fn lowered(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}
