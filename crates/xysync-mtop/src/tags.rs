//! Classification of free-text card tags.
//!
//! Each tag runs through [`CHAIN`] in order; the first classifier that
//! claims it wins and the rest never see it.

/// Canonical tag for every free-shipping marker.
pub const FREE_SHIPPING_TAG: &str = "包邮";

const WANT_SUFFIX: &str = "人想要";
const LEVEL_MARKER: &str = "level";
const CREDIT_MARKER: &str = "信用";
const FREE_SHIPPING_ICON: &str = "freeShippingIcon";

/// One tag as found on a card: its display content and the optional
/// tracking payload that sometimes carries the real classification.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TagInput<'a> {
    pub content: &'a str,
    pub tracking: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TagFindings {
    pub shop_level: Option<String>,
    pub seller_credit: Option<String>,
    pub want_count: Option<u32>,
    pub free_shipping: bool,
    /// Deduplicated, first-seen order.
    pub tags: Vec<String>,
}

impl TagFindings {
    fn push_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// Returns `true` when the tag was consumed.
type Classifier = fn(&TagInput<'_>, &mut TagFindings) -> bool;

const CHAIN: &[Classifier] = &[
    classify_level,
    classify_credit,
    classify_want_count,
    classify_general,
];

pub(crate) fn classify_tags<'a, I>(tags: I) -> TagFindings
where
    I: IntoIterator<Item = TagInput<'a>>,
{
    let mut findings = TagFindings::default();
    for tag in tags {
        if tag.content.is_empty() {
            continue;
        }
        for classifier in CHAIN {
            if classifier(&tag, &mut findings) {
                break;
            }
        }
    }
    findings
}

fn classify_level(tag: &TagInput<'_>, findings: &mut TagFindings) -> bool {
    let level = tag
        .tracking
        .filter(|t| t.contains(LEVEL_MARKER))
        .or_else(|| Some(tag.content).filter(|c| c.contains(LEVEL_MARKER)));
    match level {
        Some(level) => {
            findings.shop_level = Some(level.to_string());
            findings.push_tag(level);
            true
        }
        None => false,
    }
}

fn classify_credit(tag: &TagInput<'_>, findings: &mut TagFindings) -> bool {
    if !tag.content.contains(CREDIT_MARKER) {
        return false;
    }
    findings.seller_credit = Some(tag.content.to_string());
    findings.push_tag(tag.content);
    true
}

fn classify_want_count(tag: &TagInput<'_>, findings: &mut TagFindings) -> bool {
    if !tag.content.ends_with(WANT_SUFFIX) {
        return false;
    }
    if let Some(count) = parse_want_count(tag.content) {
        findings.want_count = Some(count);
    }
    true
}

fn classify_general(tag: &TagInput<'_>, findings: &mut TagFindings) -> bool {
    if tag.content.contains(FREE_SHIPPING_ICON) || tag.content == FREE_SHIPPING_TAG {
        findings.free_shipping = true;
        findings.push_tag(FREE_SHIPPING_TAG);
    } else {
        findings.push_tag(tag.content);
    }
    true
}

/// Parses `"N人想要"` into `N`. Accepts a `万` multiplier (`"1.2万人想要"`).
#[must_use]
pub fn parse_want_count(text: &str) -> Option<u32> {
    let number = text.trim().strip_suffix(WANT_SUFFIX)?.trim();
    if let Some(tens_of_thousands) = number.strip_suffix('万') {
        let value: f64 = tens_of_thousands.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (value * 10_000.0).round().min(f64::from(u32::MAX)) as u32;
        return Some(scaled);
    }
    number.parse().ok()
}
