//! Transition table
//!
//! The decoding state machine is data-driven: each state owns an ordered set
//! of byte-specific rules plus exactly one default rule, and every rule
//! carries the action list to execute and (via `ChangeState` and friends) the
//! resulting state. The table is authored here as rule lists, compiled once
//! into 256-entry dispatch arrays, and shared read-only for the life of the
//! process. Because every state has a default rule, lookup cannot fail on any
//! input byte; a missing default is a construction-time panic.

use std::ops::RangeInclusive;
use std::sync::OnceLock;
use std::time::Duration;

use super::keys::SpecialKey;

/// How long a bare escape byte may sit before it is reported as the Escape
/// key rather than the prefix of a longer sequence.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(10);

/// Decoder state.
///
/// States form a tree rooted at `Rest`: one branch per escape-sequence
/// family, one per UTF-8 continuation depth. Every branch returns to `Rest`
/// when its sequence completes or aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Initial state, plain byte processing
    Rest,
    /// After a bare ESC, waiting to disambiguate
    Escape,
    /// After ESC `[`, accumulating numeric parameters
    Csi,
    /// After ESC `O`, waiting for the SS3 final byte
    Ss3,
    /// Three UTF-8 continuation bytes outstanding
    Utf8Rem3,
    /// Two UTF-8 continuation bytes outstanding
    Utf8Rem2,
    /// One UTF-8 continuation byte outstanding
    Utf8Rem1,
}

impl State {
    pub(crate) const ALL: [State; 7] = [
        State::Rest,
        State::Escape,
        State::Csi,
        State::Ss3,
        State::Utf8Rem3,
        State::Utf8Rem2,
        State::Utf8Rem1,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Event payloads the table can emit directly, without consulting the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmitEvent {
    /// An interrupt request that must never be silently dropped
    Interrupt,
    /// A named key with no modifier payload
    Special(SpecialKey),
}

/// Internal decoder routines reachable from the table.
///
/// Each routine consumes the current store contents (see
/// [`Decoder`](super::engine::Decoder)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Routine {
    /// Key named by the final byte; store holds optional modifier fields
    NamedKey(SpecialKey),
    /// Key named by the leading numeric code in the store
    CodedKey,
    /// Cursor-position report, row and column as decimal strings
    CursorPos,
    /// Device-status report, payload passed through verbatim
    DeviceStatus,
}

/// One step of rule execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Emit the byte as a literal keypress
    ConsumeLiteral,
    /// Push the UTF-8 lead byte and enter the matching continuation state
    BeginMultiByte(State),
    /// Validate and push a continuation byte; `emit` marks the final one
    ContinueMultiByte { next: State, emit: bool },
    /// Unconditional state change, no emission, no store mutation
    ChangeState(State),
    /// Schedule `key` to fire after `delay` unless another byte arrives first
    ArmTimer { delay: Duration, key: SpecialKey },
    /// Fire an event; `mandatory` events may not be dropped unheard
    Emit { event: EmitEvent, mandatory: bool },
    /// Append the current byte to the store without emitting
    Store,
    /// Discard the store contents without emitting
    ClearStore,
    /// Run a decoder routine against the store contents
    Invoke(Routine),
}

/// A transition rule: the ordered actions to run for a matched byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    pub acts: Vec<Action>,
}

struct StateRules {
    by_byte: Vec<Option<Rule>>,
    fallback: Rule,
}

/// The compiled transition table.
pub(crate) struct Table {
    states: Vec<StateRules>,
}

impl Table {
    /// Find the rule for (state, byte): the byte-specific rule if one was
    /// authored, otherwise the state's default rule. Always succeeds.
    pub fn lookup(&self, state: State, byte: u8) -> &Rule {
        let entry = &self.states[state.index()];
        entry.by_byte[byte as usize].as_ref().unwrap_or(&entry.fallback)
    }

    fn build() -> Self {
        use Action::*;
        use Routine::*;

        let mut b = TableBuilder::new();

        {
            let s = b.state(State::Rest);
            // An interrupt request is never buffered behind sequence decoding
            s.on(
                0x03,
                &[Emit {
                    event: EmitEvent::Interrupt,
                    mandatory: true,
                }],
            );
            s.on(
                0x1B,
                &[
                    ArmTimer {
                        delay: ESCAPE_TIMEOUT,
                        key: SpecialKey::Escape,
                    },
                    ChangeState(State::Escape),
                ],
            );
            // UTF-8 lead bytes, by encoded length
            s.on_range(0xC0..=0xDF, &[BeginMultiByte(State::Utf8Rem1)]);
            s.on_range(0xE0..=0xEF, &[BeginMultiByte(State::Utf8Rem2)]);
            s.on_range(0xF0..=0xF7, &[BeginMultiByte(State::Utf8Rem3)]);
            s.fallback(&[ConsumeLiteral]);
        }

        {
            let s = b.state(State::Escape);
            s.on(b'[', &[ClearStore, ChangeState(State::Csi)]);
            s.on(b'O', &[ClearStore, ChangeState(State::Ss3)]);
            // Unknown follower: the escape was not a prefix after all, decode
            // the byte as the literal it is
            s.fallback(&[ChangeState(State::Rest), ConsumeLiteral]);
        }

        {
            let s = b.state(State::Csi);
            s.on_range(b'0'..=b'9', &[Store]);
            s.on(b';', &[Store]);
            s.on(b'A', &[Invoke(NamedKey(SpecialKey::Up)), ChangeState(State::Rest)]);
            s.on(b'B', &[Invoke(NamedKey(SpecialKey::Down)), ChangeState(State::Rest)]);
            s.on(b'C', &[Invoke(NamedKey(SpecialKey::Right)), ChangeState(State::Rest)]);
            s.on(b'D', &[Invoke(NamedKey(SpecialKey::Left)), ChangeState(State::Rest)]);
            s.on(b'H', &[Invoke(NamedKey(SpecialKey::Home)), ChangeState(State::Rest)]);
            s.on(b'F', &[Invoke(NamedKey(SpecialKey::End)), ChangeState(State::Rest)]);
            s.on(b'~', &[Invoke(CodedKey), ChangeState(State::Rest)]);
            s.on(b'R', &[Invoke(CursorPos), ChangeState(State::Rest)]);
            s.on(b'n', &[Invoke(DeviceStatus), ChangeState(State::Rest)]);
            s.fallback(&[ClearStore, ChangeState(State::Rest)]);
        }

        {
            let s = b.state(State::Ss3);
            s.on(b'P', &[special(SpecialKey::F1), ChangeState(State::Rest)]);
            s.on(b'Q', &[special(SpecialKey::F2), ChangeState(State::Rest)]);
            s.on(b'R', &[special(SpecialKey::F3), ChangeState(State::Rest)]);
            s.on(b'S', &[special(SpecialKey::F4), ChangeState(State::Rest)]);
            // Application cursor mode arrows
            s.on(b'A', &[special(SpecialKey::Up), ChangeState(State::Rest)]);
            s.on(b'B', &[special(SpecialKey::Down), ChangeState(State::Rest)]);
            s.on(b'C', &[special(SpecialKey::Right), ChangeState(State::Rest)]);
            s.on(b'D', &[special(SpecialKey::Left), ChangeState(State::Rest)]);
            s.fallback(&[ChangeState(State::Rest)]);
        }

        b.state(State::Utf8Rem3).fallback(&[ContinueMultiByte {
            next: State::Utf8Rem2,
            emit: false,
        }]);
        b.state(State::Utf8Rem2).fallback(&[ContinueMultiByte {
            next: State::Utf8Rem1,
            emit: false,
        }]);
        b.state(State::Utf8Rem1).fallback(&[ContinueMultiByte {
            next: State::Rest,
            emit: true,
        }]);

        b.finish()
    }
}

fn special(key: SpecialKey) -> Action {
    Action::Emit {
        event: EmitEvent::Special(key),
        mandatory: false,
    }
}

/// The process-wide table, compiled on first use.
pub(crate) fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(Table::build)
}

struct StateBuilder {
    by_byte: Vec<Option<Rule>>,
    fallback: Option<Rule>,
}

impl StateBuilder {
    fn on(&mut self, byte: u8, acts: &[Action]) -> &mut Self {
        assert!(
            self.by_byte[byte as usize].is_none(),
            "duplicate rule for byte {byte:#04x}"
        );
        self.by_byte[byte as usize] = Some(Rule { acts: acts.to_vec() });
        self
    }

    fn on_range(&mut self, range: RangeInclusive<u8>, acts: &[Action]) -> &mut Self {
        for byte in range {
            self.on(byte, acts);
        }
        self
    }

    fn fallback(&mut self, acts: &[Action]) -> &mut Self {
        self.fallback = Some(Rule { acts: acts.to_vec() });
        self
    }
}

struct TableBuilder {
    states: Vec<StateBuilder>,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            states: State::ALL
                .iter()
                .map(|_| StateBuilder {
                    by_byte: vec![None; 256],
                    fallback: None,
                })
                .collect(),
        }
    }

    fn state(&mut self, state: State) -> &mut StateBuilder {
        &mut self.states[state.index()]
    }

    fn finish(self) -> Table {
        let states = self
            .states
            .into_iter()
            .enumerate()
            .map(|(i, s)| StateRules {
                by_byte: s.by_byte,
                fallback: s
                    .fallback
                    .unwrap_or_else(|| panic!("state {:?} has no default rule", State::ALL[i])),
            })
            .collect();
        Table { states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_never_fails() {
        let t = table();
        for state in State::ALL {
            for byte in 0..=u8::MAX {
                let rule = t.lookup(state, byte);
                assert!(!rule.acts.is_empty());
            }
        }
    }

    #[test]
    fn test_byte_rule_beats_fallback() {
        let t = table();
        assert_eq!(
            t.lookup(State::Rest, 0x03).acts,
            vec![Action::Emit {
                event: EmitEvent::Interrupt,
                mandatory: true
            }]
        );
        assert_eq!(t.lookup(State::Rest, b'a').acts, vec![Action::ConsumeLiteral]);
    }

    #[test]
    fn test_escape_arms_disambiguation_timer() {
        let rule = table().lookup(State::Rest, 0x1B);
        assert_eq!(
            rule.acts[0],
            Action::ArmTimer {
                delay: ESCAPE_TIMEOUT,
                key: SpecialKey::Escape
            }
        );
        assert_eq!(rule.acts[1], Action::ChangeState(State::Escape));
    }

    #[test]
    fn test_utf8_lead_classes() {
        let t = table();
        assert_eq!(
            t.lookup(State::Rest, 0xC2).acts,
            vec![Action::BeginMultiByte(State::Utf8Rem1)]
        );
        assert_eq!(
            t.lookup(State::Rest, 0xE4).acts,
            vec![Action::BeginMultiByte(State::Utf8Rem2)]
        );
        assert_eq!(
            t.lookup(State::Rest, 0xF0).acts,
            vec![Action::BeginMultiByte(State::Utf8Rem3)]
        );
        // Continuation-shaped bytes in Rest fall through to the literal rule
        assert_eq!(t.lookup(State::Rest, 0x80).acts, vec![Action::ConsumeLiteral]);
    }

    #[test]
    fn test_continuation_chain_returns_to_rest() {
        let t = table();
        assert_eq!(
            t.lookup(State::Utf8Rem1, 0x80).acts,
            vec![Action::ContinueMultiByte {
                next: State::Rest,
                emit: true
            }]
        );
        assert_eq!(
            t.lookup(State::Utf8Rem3, 0x80).acts,
            vec![Action::ContinueMultiByte {
                next: State::Utf8Rem2,
                emit: false
            }]
        );
    }

    #[test]
    fn test_csi_parameter_bytes_store() {
        let t = table();
        for byte in [b'0', b'9', b';'] {
            assert_eq!(t.lookup(State::Csi, byte).acts, vec![Action::Store]);
        }
    }
}
