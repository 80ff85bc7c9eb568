//! Public Suffix List (PSL) validation for cookie domain security.
//!
//! Prevents supercookie attacks by rejecting cookies set on public
//! suffixes like `.com`, `.co.uk`, etc.
//!
//! Two backends implement [`PublicSuffixList`]:
//!
//! - [`MozillaList`] uses Mozilla's complete list via the `psl` crate. This
//!   is what a [`CookieJar`](crate::cookies::jar::CookieJar) uses by default.
//! - [`SuffixRules`] is a label tree built from rule text in the published
//!   list format. [`BuiltinList`] wraps a tree over a curated rule set
//!   embedded in the crate; any other list can be loaded with
//!   [`SuffixRules::parse`].
//!
//! Domains are expected in canonical form: lowercase, no leading or
//! trailing dot.

use std::cmp::Ordering;
use std::sync::OnceLock;

/// Answers "is this domain specific enough to own a domain cookie?".
pub trait PublicSuffixList: Send + Sync {
    /// The registrable domain (public suffix plus one label) of `domain`,
    /// or `None` if `domain` is itself a public suffix.
    fn effective_tld_plus_one<'a>(&self, domain: &'a str) -> Option<&'a str>;

    /// True if a domain cookie may be set for `domain`.
    fn allow_domain_cookies(&self, domain: &str) -> bool {
        self.effective_tld_plus_one(domain).is_some()
    }

    /// True if `domain` is a public suffix (e.g. "com", "co.uk").
    fn is_public_suffix(&self, domain: &str) -> bool {
        !self.allow_domain_cookies(domain)
    }
}

// ---------------------------------------------------------------------------
// Mozilla list

/// Backend over the complete Public Suffix List shipped with the `psl` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MozillaList;

impl PublicSuffixList for MozillaList {
    fn effective_tld_plus_one<'a>(&self, domain: &'a str) -> Option<&'a str> {
        let len = psl::domain(domain.as_bytes())?.as_bytes().len();
        domain.get(domain.len() - len..)
    }
}

/// Get the registrable domain (eTLD+1) for a domain from the Mozilla list.
/// For "sub.example.com", returns "example.com".
/// For "com" (public suffix), returns None.
pub fn registrable_domain(domain: &str) -> Option<String> {
    let domain_lower = domain.to_lowercase();
    MozillaList
        .effective_tld_plus_one(&domain_lower)
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Rule tree

/// Kind of a node in the rule tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Internal node only, not a rule by itself.
    None,
    /// A normal rule like "co.uk".
    Normal,
    /// An exception rule like "!city.kobe.jp".
    Exception,
    /// A wildcard rule like "*.kobe.jp", stored on the "kobe" node.
    Wildcard,
}

#[derive(Debug, Clone)]
struct Node {
    label: String,
    kind: RuleKind,
    /// Sorted by label.
    children: Vec<Node>,
}

impl Node {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: RuleKind::None,
            children: Vec::new(),
        }
    }

    fn find(&self, label: &str) -> Option<&Node> {
        self.children
            .binary_search_by(|n| n.label.as_str().cmp(label))
            .ok()
            .map(|i| &self.children[i])
    }

    fn find_or_insert(&mut self, label: &str) -> &mut Node {
        let idx = match self
            .children
            .binary_search_by(|n| n.label.as_str().cmp(label))
        {
            Ok(i) => i,
            Err(i) => {
                self.children.insert(i, Node::new(label));
                i
            }
        };
        &mut self.children[idx]
    }

    fn mark(&mut self, kind: RuleKind) {
        // An exception always wins, a wildcard implies its normal rule.
        let rank = |k: RuleKind| match k {
            RuleKind::None => 0,
            RuleKind::Normal => 1,
            RuleKind::Wildcard => 2,
            RuleKind::Exception => 3,
        };
        if rank(kind) > rank(self.kind) {
            self.kind = kind;
        }
    }
}

/// Public suffix rules stored as a forest of labels, read right to left.
///
/// The prevailing rule for a domain is the deepest rule node reached while
/// walking the domain's labels from the right. That works because the list
/// never contains both "!a.b" and "*.a.b".
#[derive(Debug, Clone)]
pub struct SuffixRules {
    root: Node,
    rules: usize,
}

static BUILTIN: OnceLock<SuffixRules> = OnceLock::new();

impl SuffixRules {
    /// Build a tree from text in the Public Suffix List format.
    ///
    /// Blank lines and `//` comments are skipped, only the first
    /// whitespace-separated token of a line is read.
    pub fn parse(list: &str) -> Self {
        let mut rules = SuffixRules {
            root: Node::new(""),
            rules: 0,
        };

        for line in list.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(rule) = line.split_whitespace().next() {
                rules.insert(rule);
            }
        }

        rules
    }

    /// The curated rule set embedded in the crate.
    pub fn builtin() -> &'static SuffixRules {
        BUILTIN.get_or_init(|| SuffixRules::parse(include_str!("public_suffix_rules.dat")))
    }

    fn insert(&mut self, rule: &str) {
        let rule = rule.to_lowercase();
        let (rule, mut kind) = match rule.strip_prefix('!') {
            Some(rest) => (rest, RuleKind::Exception),
            None => (rule.as_str(), RuleKind::Normal),
        };
        let rule = match rule.strip_prefix("*.") {
            Some(rest) if kind == RuleKind::Normal => {
                kind = RuleKind::Wildcard;
                rest
            }
            _ => rule,
        };
        if rule.is_empty() {
            return;
        }

        let mut node = &mut self.root;
        for label in rule.rsplit('.') {
            node = node.find_or_insert(label);
        }
        node.mark(kind);
        self.rules += 1;
    }

    /// Number of rules read.
    pub fn len(&self) -> usize {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules == 0
    }
}

impl PublicSuffixList for SuffixRules {
    fn effective_tld_plus_one<'a>(&self, domain: &'a str) -> Option<&'a str> {
        if domain.is_empty() {
            return None;
        }

        let labels: Vec<&str> = domain.split('.').collect();
        let n = labels.len();

        // Deepest rule node and the number of labels it covers.
        let mut prevailing: Option<(RuleKind, usize)> = None;
        let mut node = &self.root;
        for (depth, label) in labels.iter().rev().enumerate() {
            match node.find(label) {
                Some(child) => {
                    node = child;
                    if child.kind != RuleKind::None {
                        prevailing = Some((child.kind, depth + 1));
                    }
                }
                None => break,
            }
        }

        let wanted = match prevailing {
            Some((RuleKind::Normal, depth)) => depth + 1,
            Some((RuleKind::Exception, depth)) => depth,
            Some((RuleKind::Wildcard, depth)) => depth + 2,
            // No rule matches: the default rule is "*".
            Some((RuleKind::None, _)) | None => 2,
        };

        match wanted.cmp(&n) {
            Ordering::Greater => None,
            Ordering::Equal => Some(domain),
            Ordering::Less => Some(last_labels(domain, wanted)),
        }
    }
}

/// The suffix of `domain` made of its last `count` labels.
fn last_labels(domain: &str, count: usize) -> &str {
    let start = domain
        .rmatch_indices('.')
        .nth(count - 1)
        .map(|(i, _)| i + 1)
        .unwrap_or(0);
    &domain[start..]
}

/// Backend over [`SuffixRules::builtin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinList;

impl PublicSuffixList for BuiltinList {
    fn effective_tld_plus_one<'a>(&self, domain: &'a str) -> Option<&'a str> {
        SuffixRules::builtin().effective_tld_plus_one(domain)
    }
}

/// eTLD+1 of `domain` under the builtin rules.
pub fn effective_tld_plus_one(domain: &str) -> Option<&str> {
    BuiltinList.effective_tld_plus_one(domain)
}

/// Whether the builtin rules allow a domain cookie for `domain`.
pub fn allow_domain_cookies(domain: &str) -> bool {
    BuiltinList.allow_domain_cookies(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_effective_tld_plus_one() {
        let cases: &[(&str, Option<&str>)] = &[
            // Unlisted TLD.
            ("example", None),
            ("example.example", Some("example.example")),
            ("b.example.example", Some("example.example")),
            ("a.b.example.example", Some("example.example")),
            // TLD with only 1 rule.
            ("biz", None),
            ("domain.biz", Some("domain.biz")),
            ("b.domain.biz", Some("domain.biz")),
            ("a.b.domain.biz", Some("domain.biz")),
            // TLD with some 2-level rules.
            ("com", None),
            ("example.com", Some("example.com")),
            ("b.example.com", Some("example.com")),
            ("a.b.example.com", Some("example.com")),
            ("uk.com", None),
            ("example.uk.com", Some("example.uk.com")),
            ("b.example.uk.com", Some("example.uk.com")),
            ("a.b.example.uk.com", Some("example.uk.com")),
            ("test.ac", Some("test.ac")),
            // TLD with only 1 (wildcard) rule.
            ("cy", None),
            ("c.cy", None),
            ("b.c.cy", Some("b.c.cy")),
            ("a.b.c.cy", Some("b.c.cy")),
            // More complex TLD.
            ("jp", None),
            ("test.jp", Some("test.jp")),
            ("www.test.jp", Some("test.jp")),
            ("ac.jp", None),
            ("test.ac.jp", Some("test.ac.jp")),
            ("www.test.ac.jp", Some("test.ac.jp")),
            ("kyoto.jp", None),
            ("test.kyoto.jp", Some("test.kyoto.jp")),
            ("ide.kyoto.jp", None),
            ("b.ide.kyoto.jp", Some("b.ide.kyoto.jp")),
            ("a.b.ide.kyoto.jp", Some("b.ide.kyoto.jp")),
            ("c.kobe.jp", None),
            ("b.c.kobe.jp", Some("b.c.kobe.jp")),
            ("a.b.c.kobe.jp", Some("b.c.kobe.jp")),
            ("city.kobe.jp", Some("city.kobe.jp")),
            // TLD with a wildcard rule and exceptions.
            ("om", None),
            ("test.om", None),
            ("b.test.om", Some("b.test.om")),
            ("a.b.test.om", Some("b.test.om")),
            ("songfest.om", Some("songfest.om")),
            ("www.songfest.om", Some("songfest.om")),
            // US K12.
            ("us", None),
            ("test.us", Some("test.us")),
            ("www.test.us", Some("test.us")),
            ("ak.us", None),
            ("test.ak.us", Some("test.ak.us")),
            ("www.test.ak.us", Some("test.ak.us")),
            ("k12.ak.us", None),
            ("test.k12.ak.us", Some("test.k12.ak.us")),
            ("www.test.k12.ak.us", Some("test.k12.ak.us")),
        ];

        for (domain, expected) in cases {
            assert_eq!(effective_tld_plus_one(domain), *expected, "domain={domain}");
        }
    }

    #[test]
    fn test_builtin_allow_domain_cookies() {
        let cases = [
            ("something.strange", true),
            ("ourintranet", false),
            ("com", false),
            ("google.com", true),
            ("www.google.com", true),
            ("uk", false),
            ("co.uk", false),
            ("bbc.co.uk", true),
            ("foo.www.bbc.co.uk", true),
            ("kawasaki.jp", false),
            ("bar.kawasaki.jp", false),
            ("foo.bar.kawasaki.jp", true),
            ("city.kawasaki.jp", true),
            ("aichi.jp", false),
            ("aisai.aichi.jp", false),
            ("foo.aisai.aichi.jp", true),
        ];

        for (domain, allow) in cases {
            assert_eq!(allow_domain_cookies(domain), allow, "domain={domain}");
        }
    }

    #[test]
    fn test_internal_node_falls_back_to_parent_rule() {
        // "amazonaws.com" is only an internal node; "com" prevails.
        assert_eq!(
            effective_tld_plus_one("www.amazonaws.com"),
            Some("amazonaws.com")
        );
        assert_eq!(
            effective_tld_plus_one("a.b.compute.amazonaws.com"),
            Some("a.b.compute.amazonaws.com")
        );
        assert_eq!(effective_tld_plus_one("b.compute.amazonaws.com"), None);
    }

    #[test]
    fn test_parse_custom_list() {
        let rules = SuffixRules::parse(
            "// comment\n\nexample\n*.wild.example  trailing words\n!keep.wild.example\n",
        );
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.effective_tld_plus_one("a.example"), Some("a.example"));
        assert_eq!(rules.effective_tld_plus_one("x.wild.example"), None);
        assert_eq!(
            rules.effective_tld_plus_one("y.x.wild.example"),
            Some("y.x.wild.example")
        );
        assert_eq!(
            rules.effective_tld_plus_one("www.keep.wild.example"),
            Some("keep.wild.example")
        );
        assert!(rules.is_public_suffix("example"));
        assert!(!rules.is_public_suffix("a.example"));
    }

    #[test]
    fn test_empty_rules_use_default() {
        let rules = SuffixRules::parse("");
        assert!(rules.is_empty());
        assert_eq!(rules.effective_tld_plus_one(""), None);
        assert_eq!(rules.effective_tld_plus_one("a.b.c"), Some("b.c"));
    }

    #[test]
    fn test_is_public_suffix_com() {
        assert!(MozillaList.is_public_suffix("com"));
        assert!(MozillaList.is_public_suffix("co.uk"));
        assert!(MozillaList.is_public_suffix("github.io"));
    }

    #[test]
    fn test_not_public_suffix() {
        assert!(!MozillaList.is_public_suffix("example.com"));
        assert!(!MozillaList.is_public_suffix("google.com"));
        assert!(!MozillaList.is_public_suffix("sub.example.com"));
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(
            registrable_domain("example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            registrable_domain("sub.example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            registrable_domain("deep.sub.example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            registrable_domain("SUB.Example.CO.UK"),
            Some("example.co.uk".to_string())
        );
    }

    #[test]
    fn test_registrable_domain_public_suffix() {
        // Public suffix has no registrable domain
        assert_eq!(registrable_domain("com"), None);
        assert_eq!(registrable_domain("co.uk"), None);
    }

    #[test]
    fn test_public_suffix_is_the_negation_of_allow_domain_cookies() {
        let domains = [
            "com",
            "co.uk",
            "bbc.co.uk",
            "github.io",
            "user.github.io",
            "ourintranet",
            "www.host.test",
            "city.kawasaki.jp",
            "",
        ];
        for list in [&MozillaList as &dyn PublicSuffixList, &BuiltinList] {
            for domain in domains {
                assert_eq!(
                    list.is_public_suffix(domain),
                    !list.allow_domain_cookies(domain),
                    "{domain:?}"
                );
            }
        }
    }

    #[test]
    fn test_mozilla_allow_domain_cookies() {
        assert!(MozillaList.allow_domain_cookies("bbc.co.uk"));
        assert!(!MozillaList.allow_domain_cookies("co.uk"));
        assert!(!MozillaList.allow_domain_cookies("com"));
    }
}
