// Standard IP access control lists
//
// Read path: `show ip access-lists` text output is split into per-ACL
// blocks and each entry line is decoded through a fixed capture grammar.
// Write path: mutations become ordered config-mode command sequences
// applied through `EapiNode::configure`. Nothing is cached; every query
// re-reads the device.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::Encoding;
use crate::node::EapiNode;

/// Marker line opening a standard ACL block in show output.
static ACL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Standard IP Access List (\S+)$\n").expect("valid ACL marker regex")
});

/// A blank line ends a block.
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^$").expect("valid blank-line regex"));

/// Candidate entry lines: a sequence number followed by permit/deny.
static ENTRY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+ [pd].*$").expect("valid entry-line regex"));

/// The full entry grammar: sequence, action, optional `any`/`host`
/// tokens, optional address, optional `/len` suffix, optional dotted
/// mask, optional trailing `log`.
static ENTRY_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+)(?: ([pd]\w+))(?: (any))?(?: (host))?(?: ([0-9]+(?:\.[0-9]+){3}))?(?:/([0-9]{1,2}))?(?: ([0-9]+(?:\.[0-9]+){3}))?(?: (log))?",
    )
    .expect("valid entry grammar regex")
});

/// The kind of an ACL resource. Extended ACLs (destination/protocol
/// matching) are not covered by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclKind {
    Standard,
}

impl fmt::Display for AclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
        }
    }
}

/// The verdict of an ACL rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Permit,
    Deny,
}

impl AclAction {
    /// Decode the action word from an entry line. The CLI abbreviates,
    /// so only the leading letter is significant.
    fn from_cli(word: &str) -> Option<Self> {
        match word.as_bytes().first() {
            Some(b'p') => Some(Self::Permit),
            Some(b'd') => Some(Self::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for AclAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => f.write_str("permit"),
            Self::Deny => f.write_str("deny"),
        }
    }
}

/// One numbered rule in a standard ACL.
///
/// Defaults applied during parsing: a missing address means `any`
/// (`0.0.0.0`), a missing prefix length means host semantics (`/32`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclEntry {
    pub action: AclAction,
    pub src_addr: Ipv4Addr,
    pub src_len: u8,
    pub log: bool,
}

/// A standard ACL with its entries keyed by sequence number.
///
/// The device, not this layer, enforces evaluation order; the map is
/// ordered only so output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardAcl {
    pub name: String,
    pub kind: AclKind,
    pub entries: BTreeMap<u32, AclEntry>,
}

/// A contiguous slice of show output belonging to one standard ACL:
/// from the marker line to the last non-blank line of the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclBlock {
    pub name: String,
    pub text: String,
}

// ── Mask conversions ─────────────────────────────────────────────────

/// Convert a dotted-decimal subnet mask to its prefix length.
///
/// Returns `None` for unparseable input and for non-contiguous
/// ("wildcard") masks, which have no CIDR prefix length.
pub fn mask_to_prefix_len(mask: &str) -> Option<u8> {
    let bits = u32::from(mask.parse::<Ipv4Addr>().ok()?);
    if bits.leading_ones() + bits.trailing_zeros() != 32 {
        return None;
    }
    u8::try_from(bits.leading_ones()).ok()
}

/// Convert a prefix length (0..=32) to its dotted-decimal subnet mask.
pub fn prefix_len_to_mask(prefix_len: u8) -> Option<Ipv4Addr> {
    if prefix_len > 32 {
        return None;
    }
    let bits = if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    };
    Some(Ipv4Addr::from(bits))
}

// ── Text parsing ─────────────────────────────────────────────────────

/// Split combined `show ip access-lists` output into per-ACL blocks.
///
/// Lazy and restartable; input with no marker lines yields an empty
/// iterator, never an error.
pub fn split_acl_blocks(config: &str) -> impl Iterator<Item = AclBlock> + '_ {
    ACL_MARKER.captures_iter(config).map(|caps| {
        let whole = caps.get(0).expect("group 0 always participates");
        let rest = &config[whole.end()..];
        let end = BLANK_LINE
            .find(rest)
            .map_or(config.len(), |blank| whole.end() + blank.start());
        AclBlock {
            name: caps[1].to_string(),
            text: config[whole.start()..end].to_string(),
        }
    })
}

/// Decode the entry lines of one ACL block.
///
/// Lines that do not match the grammar, or that match but carry values
/// out of range (sequence overflow, bad address, non-contiguous mask),
/// are silently skipped.
pub fn parse_entries(config: &str) -> BTreeMap<u32, AclEntry> {
    ENTRY_LINE
        .find_iter(config)
        .filter_map(|line| parse_entry_line(line.as_str()))
        .collect()
}

fn parse_entry_line(line: &str) -> Option<(u32, AclEntry)> {
    let caps = ENTRY_GRAMMAR.captures(line)?;
    let seq: u32 = caps[1].parse().ok()?;
    let action = AclAction::from_cli(&caps[2])?;

    let src_addr = match caps.get(5) {
        Some(addr) => addr.as_str().parse().ok()?,
        None => Ipv4Addr::UNSPECIFIED,
    };

    // Precedence: explicit /len, then dotted mask, then host default.
    let src_len = match caps.get(6) {
        Some(len) => len.as_str().parse().ok().filter(|l| *l <= 32)?,
        None => {
            let mask = caps.get(7).map_or("255.255.255.255", |m| m.as_str());
            mask_to_prefix_len(mask)?
        }
    };

    let log = caps.get(8).is_some();

    Some((
        seq,
        AclEntry {
            action,
            src_addr,
            src_len,
            log,
        },
    ))
}

// ── Resource operations ──────────────────────────────────────────────

/// Handle for the standard ACL resources on one node.
///
/// Obtained from [`EapiNode::standard_acls`]. Every method is a single
/// round trip; reads return `Ok(None)` when the device has no matching
/// configuration, while transport and command failures surface as
/// errors.
pub struct StandardAcls<'a> {
    node: &'a EapiNode,
}

impl<'a> StandardAcls<'a> {
    pub(crate) fn new(node: &'a EapiNode) -> Self {
        Self { node }
    }

    /// Fetch one standard ACL by name.
    ///
    /// `show ip access-lists <name>` (text encoding). An ACL the device
    /// does not know yields empty output, which maps to `Ok(None)`.
    pub async fn get(&self, name: &str) -> Result<Option<StandardAcl>, Error> {
        debug!(name, "fetching standard ACL");
        let results = self
            .node
            .enable(&[format!("show ip access-lists {name}")], Encoding::Text)
            .await?;

        let config = results
            .first()
            .and_then(|r| r.output.as_deref())
            .unwrap_or("");
        if config.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(StandardAcl {
            name: name.to_string(),
            kind: AclKind::Standard,
            entries: parse_entries(config),
        }))
    }

    /// Fetch every standard ACL on the device, keyed by name.
    ///
    /// `show ip access-lists` (text encoding). Empty output maps to
    /// `Ok(None)`; output with no standard ACL blocks yields an empty
    /// map.
    pub async fn get_all(&self) -> Result<Option<BTreeMap<String, StandardAcl>>, Error> {
        debug!("fetching all standard ACLs");
        let results = self
            .node
            .enable(&["show ip access-lists".to_string()], Encoding::Text)
            .await?;

        let config = results
            .first()
            .and_then(|r| r.output.as_deref())
            .unwrap_or("");
        if config.trim().is_empty() {
            return Ok(None);
        }

        let mut acls = BTreeMap::new();
        for block in split_acl_blocks(config) {
            let entries = parse_entries(&block.text);
            acls.insert(
                block.name.clone(),
                StandardAcl {
                    name: block.name,
                    kind: AclKind::Standard,
                    entries,
                },
            );
        }
        Ok(Some(acls))
    }

    /// Create an (empty) standard ACL.
    ///
    /// `ip access-list standard <name>`
    pub async fn create(&self, name: &str) -> Result<(), Error> {
        debug!(name, "creating standard ACL");
        self.node
            .configure(&[format!("ip access-list standard {name}")])
            .await?;
        Ok(())
    }

    /// Delete a standard ACL and all of its entries.
    ///
    /// `no ip access-list standard <name>`
    pub async fn delete(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting standard ACL");
        self.node
            .configure(&[format!("no ip access-list standard {name}")])
            .await?;
        Ok(())
    }

    /// Reset a standard ACL to its default (empty) configuration.
    ///
    /// `default ip access-list standard <name>`
    pub async fn set_default(&self, name: &str) -> Result<(), Error> {
        debug!(name, "defaulting standard ACL");
        self.node
            .configure(&[format!("default ip access-list standard {name}")])
            .await?;
        Ok(())
    }

    /// Append a rule to an ACL. The device assigns the sequence number;
    /// this layer does not predict it.
    pub async fn add_entry(
        &self,
        name: &str,
        action: AclAction,
        addr: Ipv4Addr,
        prefix_len: u8,
        log: bool,
    ) -> Result<(), Error> {
        debug!(name, %action, %addr, prefix_len, "adding ACL entry");
        let cmds = [
            format!("ip access-list standard {name}"),
            rule_spec(None, action, addr, prefix_len, log),
            "exit".to_string(),
        ];
        self.node.configure(&cmds).await?;
        Ok(())
    }

    /// Replace the rule at `seq` with a new one.
    ///
    /// Sent as one batch (`no <seq>`, then the replacement); on
    /// rejection [`Error::CommandFailed`] reports how far the batch
    /// got, so a caller can detect a removal whose replacement failed.
    pub async fn update_entry(
        &self,
        name: &str,
        seq: u32,
        action: AclAction,
        addr: Ipv4Addr,
        prefix_len: u8,
        log: bool,
    ) -> Result<(), Error> {
        debug!(name, seq, %action, %addr, prefix_len, "updating ACL entry");
        let cmds = [
            format!("ip access-list standard {name}"),
            format!("no {seq}"),
            rule_spec(Some(seq), action, addr, prefix_len, log),
            "exit".to_string(),
        ];
        self.node.configure(&cmds).await?;
        Ok(())
    }

    /// Remove the rule at `seq`.
    pub async fn remove_entry(&self, name: &str, seq: u32) -> Result<(), Error> {
        debug!(name, seq, "removing ACL entry");
        let cmds = [
            format!("ip access-list standard {name}"),
            format!("no {seq}"),
            "exit".to_string(),
        ];
        self.node.configure(&cmds).await?;
        Ok(())
    }
}

/// Render one rule line: `[<seq> ]<action> <addr>/<len>[ log]`.
fn rule_spec(
    seq: Option<u32>,
    action: AclAction,
    addr: Ipv4Addr,
    prefix_len: u8,
    log: bool,
) -> String {
    let mut spec = match seq {
        Some(seq) => format!("{seq} {action} {addr}/{prefix_len}"),
        None => format!("{action} {addr}/{prefix_len}"),
    };
    if log {
        spec.push_str(" log");
    }
    spec
}
