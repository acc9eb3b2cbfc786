//! Generated `@keyframes` animations.
//!
//! A [`Keyframes`] description mixes two shapes: selector-keyed frames
//! (`from { opacity: 0; transform: .. }`) and property-keyed tracks
//! (`opacity: { from: 0, to: 1 }`). Both render to plain selector blocks, so
//! the same animation can be written either way.

use std::fmt;

use super::{timed, Animator, Timing};
use crate::callbacks::CallbackChain;
use crate::error::Result;
use crate::platform::Platform;
use crate::transform::css_number;

/// Largest random value used for rule names (exclusive)
const RULE_TAG_SPACE: u64 = 10_000_000_000_000_000;

/// A keyframe selector: `from`, `to` or a percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSelector {
    From,
    To,
    Percent(f64),
}

impl FrameSelector {
    /// Classify a description key. `from`, `to` and finite numbers are
    /// selectors; anything else is a property name and yields `None`.
    ///
    /// Empty keys and non-finite numbers (`Infinity`, `NaN`) count as
    /// property names, since `%` or `Infinity%` would not be a valid
    /// keyframe selector.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "from" => Some(FrameSelector::From),
            "to" => Some(FrameSelector::To),
            other => other
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(FrameSelector::Percent),
        }
    }
}

impl fmt::Display for FrameSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSelector::From => write!(f, "from"),
            FrameSelector::To => write!(f, "to"),
            FrameSelector::Percent(p) => write!(f, "{}%", css_number(*p)),
        }
    }
}

/// One entry of a [`Keyframes`] description
#[derive(Debug, Clone, PartialEq)]
pub enum KeyframeEntry {
    /// A selector with its declarations
    Frame {
        selector: FrameSelector,
        declarations: Vec<(String, String)>,
    },
    /// A property with its value at each selector
    Property {
        property: String,
        frames: Vec<(FrameSelector, String)>,
    },
}

impl KeyframeEntry {
    fn write_blocks(&self, out: &mut String) {
        match self {
            KeyframeEntry::Frame {
                selector,
                declarations,
            } => {
                out.push_str(&format!("{} {{", selector));
                for (property, value) in declarations {
                    out.push_str(&format!("{}:{};", property, value));
                }
                out.push_str("} ");
            }
            KeyframeEntry::Property { property, frames } => {
                for (selector, value) in frames {
                    out.push_str(&format!("{} {{{}:{};}} ", selector, property, value));
                }
            }
        }
    }
}

/// A declarative keyframe animation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyframes {
    entries: Vec<KeyframeEntry>,
}

impl Keyframes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selector-keyed frame
    pub fn frame<I, K, V>(mut self, selector: FrameSelector, declarations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.push(KeyframeEntry::Frame {
            selector,
            declarations: declarations
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    /// Add a property-keyed track
    pub fn property<I, V>(mut self, property: impl Into<String>, frames: I) -> Self
    where
        I: IntoIterator<Item = (FrameSelector, V)>,
        V: Into<String>,
    {
        self.entries.push(KeyframeEntry::Property {
            property: property.into(),
            frames: frames.into_iter().map(|(s, v)| (s, v.into())).collect(),
        });
        self
    }

    /// Add an entry keyed by description text.
    ///
    /// A selector key (`from`, `to`, `50`) adds a frame whose pairs are
    /// property declarations. Any other key is a property name, and its
    /// pairs map selectors to values; pairs whose key is not a selector are
    /// skipped.
    pub fn entry<I, K, V>(mut self, key: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()));
        let entry = match FrameSelector::parse(key) {
            Some(selector) => KeyframeEntry::Frame {
                selector,
                declarations: pairs.collect(),
            },
            None => KeyframeEntry::Property {
                property: key.to_string(),
                frames: pairs
                    .filter_map(|(k, v)| match FrameSelector::parse(&k) {
                        Some(selector) => Some((selector, v)),
                        None => {
                            log::warn!("keyframes: {:?} is not a selector for {}", k, key);
                            None
                        }
                    })
                    .collect(),
            },
        };
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: KeyframeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[KeyframeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(selector, property, value)` triple, in rendering order
    pub fn declarations(&self) -> Vec<(FrameSelector, String, String)> {
        let mut triples = Vec::new();
        for entry in &self.entries {
            match entry {
                KeyframeEntry::Frame {
                    selector,
                    declarations,
                } => {
                    for (property, value) in declarations {
                        triples.push((*selector, property.clone(), value.clone()));
                    }
                }
                KeyframeEntry::Property { property, frames } => {
                    for (selector, value) in frames {
                        triples.push((*selector, property.clone(), value.clone()));
                    }
                }
            }
        }
        triples
    }

    /// The selector blocks without the surrounding rule
    pub fn to_css_blocks(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            entry.write_blocks(&mut out);
        }
        out
    }

    /// The complete `@keyframes` rule
    pub fn to_css_rule(&self, name: &str) -> String {
        format!("@keyframes {} {{ {}}}", name, self.to_css_blocks())
    }
}

/// Options for [`Animator::animate`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyframeOptions {
    pub timing: Timing,
    pub delay_ms: f64,
}

impl KeyframeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = timing.into();
        self
    }

    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl<P: Platform> Animator<P> {
    /// Run `keyframes` on `element` for `duration_ms`.
    ///
    /// The rule lives in its own stylesheet fragment under a fresh name. After
    /// `duration_ms + delay` the fragment is removed, the element's previous
    /// `animation` value is restored and the returned chain completes.
    pub fn animate(
        &self,
        element: &P::Element,
        keyframes: &Keyframes,
        duration_ms: f64,
        options: &KeyframeOptions,
    ) -> Result<CallbackChain> {
        let name = self.claim_rule_name();
        let css = keyframes.to_css_rule(&name);

        let sheet = match self.platform.insert_stylesheet(&css) {
            Ok(sheet) => sheet,
            Err(err) => {
                self.release_rule_name(&name);
                return Err(err);
            }
        };

        let shorthand = timed(&name, duration_ms, &options.timing, options.delay_ms);
        let started = self
            .platform
            .inline_style(element, "animation")
            .and_then(|prev| {
                self.platform
                    .set_inline_style(element, "animation", &shorthand)?;
                Ok(prev)
            });
        let prev_animation = match started {
            Ok(prev) => prev,
            Err(err) => {
                if let Err(cleanup) = self.platform.remove_stylesheet(sheet) {
                    log::warn!("animate: could not remove {}: {}", name, cleanup);
                }
                self.release_rule_name(&name);
                return Err(err);
            }
        };

        log::debug!("animate: {} ({})", shorthand, css);

        let chain = CallbackChain::new();
        let done = chain.clone();
        let platform = self.platform.clone();
        let target = element.clone();
        let active_rules = self.active_rules.clone();
        let rule = name.clone();
        let restore_animation = prev_animation.clone();
        let scheduled = self.platform.set_timeout(
            duration_ms + options.delay_ms,
            Box::new(move || {
                if let Err(err) = platform.remove_stylesheet(sheet) {
                    log::warn!("animate: could not remove {}: {}", name, err);
                }
                if let Err(err) = platform.set_inline_style(&target, "animation", &prev_animation) {
                    log::warn!("animate: could not restore animation: {}", err);
                }
                active_rules.borrow_mut().remove(&name);
                done.done();
            }),
        );
        if let Err(err) = scheduled {
            if let Err(cleanup) = self.platform.remove_stylesheet(sheet) {
                log::warn!("animate: could not remove {}: {}", rule, cleanup);
            }
            if let Err(restore) =
                self.platform
                    .set_inline_style(element, "animation", &restore_animation)
            {
                log::warn!("animate: could not restore animation: {}", restore);
            }
            self.release_rule_name(&rule);
            return Err(err);
        }

        Ok(chain)
    }

    /// Run `keyframes` on every element. The per-element chains are dropped,
    /// so there is no way to observe when the batch finishes.
    pub fn animate_all<'a, I>(
        &self,
        elements: I,
        keyframes: &Keyframes,
        duration_ms: f64,
        options: &KeyframeOptions,
    ) -> Result<()>
    where
        I: IntoIterator<Item = &'a P::Element>,
        P::Element: 'a,
    {
        for element in elements {
            self.animate(element, keyframes, duration_ms, options)?;
        }
        Ok(())
    }

    /// Names of the generated rules still attached to the document
    pub fn active_rules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.active_rules.borrow().iter().cloned().collect();
        names.sort();
        names
    }

    fn claim_rule_name(&self) -> String {
        let mut active = self.active_rules.borrow_mut();
        loop {
            let name = format!("{}{}", self.config.rule_prefix, random_tag());
            if active.insert(name.clone()) {
                return name;
            }
        }
    }

    fn release_rule_name(&self, name: &str) {
        self.active_rules.borrow_mut().remove(name);
    }
}

fn random_tag() -> String {
    to_base36(rand::random_range(0..RULE_TAG_SPACE))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
