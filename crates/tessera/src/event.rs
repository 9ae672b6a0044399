//! Input model: participants and the ordered events between them.
//!
//! A [`Diagram`] is what a front end hands to the layout engine. Events are
//! laid out top to bottom in the order they appear; participants referenced
//! by an event but never declared get a lifeline on first reference.

use tessera_core::identifier::Id;

/// A participant declared up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    id: Id,
    display: String,
}

impl Participant {
    pub fn new(id: impl Into<Id>, display: &str) -> Self {
        Self {
            id: id.into(),
            display: display.to_string(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Name drawn in the participant head.
    pub fn display(&self) -> &str {
        &self.display
    }
}

/// How a message arrow is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowStyle {
    /// Solid line, filled head
    #[default]
    Sync,
    /// Solid line, open head
    Async,
    /// Dashed line, open head
    Return,
}

/// Which side of a message an attached note goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSide {
    Left,
    Right,
}

/// A note attached to a message and laid out on the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageNote {
    side: NoteSide,
    text: String,
}

impl MessageNote {
    pub fn new(side: NoteSide, text: &str) -> Self {
        Self {
            side,
            text: text.to_string(),
        }
    }

    pub fn side(&self) -> NoteSide {
        self.side
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Where a standalone note is placed relative to lifelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePlacement {
    LeftOf(Id),
    RightOf(Id),
    Over(Id),
    /// Spans from the first lifeline to the second, in either order.
    Across(Id, Id),
}

/// One entry of the diagram body.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    Message {
        from: Id,
        to: Id,
        label: Option<String>,
        style: ArrowStyle,
        note: Option<MessageNote>,
    },
    Note {
        placement: NotePlacement,
        text: String,
    },
    Activate(Id),
    Deactivate(Id),
    Destroy(Id),
    /// Horizontal separator across the whole diagram, with an optional title.
    Divider(Option<String>),
    /// Elided time, drawn as a break in every lifeline.
    Delay(Option<String>),
    /// Blank vertical space of the given height.
    Spacer(f32),
    /// Opens a combined fragment such as `alt`, `loop` or `opt`.
    FragmentStart {
        operator: String,
        guard: Option<String>,
    },
    /// Starts the next section of the innermost open fragment.
    FragmentElse {
        guard: Option<String>,
    },
    FragmentEnd,
}

impl SequenceEvent {
    /// A synchronous message with an optional label.
    pub fn message(from: impl Into<Id>, to: impl Into<Id>, label: Option<&str>) -> Self {
        Self::Message {
            from: from.into(),
            to: to.into(),
            label: label.map(str::to_string),
            style: ArrowStyle::Sync,
            note: None,
        }
    }

    pub fn note(placement: NotePlacement, text: &str) -> Self {
        Self::Note {
            placement,
            text: text.to_string(),
        }
    }

    /// Changes the arrow style of a message; other events are returned unchanged.
    pub fn with_style(mut self, arrow: ArrowStyle) -> Self {
        if let Self::Message { style, .. } = &mut self {
            *style = arrow;
        }
        self
    }

    /// Attaches a note to a message; other events are returned unchanged.
    pub fn with_note(mut self, side: NoteSide, text: &str) -> Self {
        if let Self::Message { note, .. } = &mut self {
            *note = Some(MessageNote::new(side, text));
        }
        self
    }
}

/// A complete diagram ready for layout.
///
/// # Examples
///
/// ```
/// # use tessera::event::{Diagram, SequenceEvent};
/// let diagram = Diagram::new()
///     .with_participant("alice", "Alice")
///     .with_event(SequenceEvent::message("alice", "bob", Some("hello")));
///
/// assert_eq!(diagram.participants().len(), 1);
/// assert_eq!(diagram.events().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    participants: Vec<Participant>,
    events: Vec<SequenceEvent>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a participant (builder style). Declaration order is the
    /// left-to-right lifeline order.
    pub fn with_participant(mut self, id: &str, display: &str) -> Self {
        self.participants.push(Participant::new(id, display));
        self
    }

    /// Appends an event (builder style).
    pub fn with_event(mut self, event: SequenceEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn push(&mut self, event: SequenceEvent) {
        self.events.push(event);
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn events(&self) -> &[SequenceEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_modifiers() {
        let event = SequenceEvent::message("a", "b", Some("reply"))
            .with_style(ArrowStyle::Return)
            .with_note(NoteSide::Right, "cached");

        match event {
            SequenceEvent::Message {
                from,
                to,
                label,
                style,
                note,
            } => {
                assert_eq!(from, "a");
                assert_eq!(to, "b");
                assert_eq!(label.as_deref(), Some("reply"));
                assert_eq!(style, ArrowStyle::Return);
                let note = note.unwrap();
                assert_eq!(note.side(), NoteSide::Right);
                assert_eq!(note.text(), "cached");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_modifiers_ignore_other_events() {
        let event = SequenceEvent::Divider(None).with_style(ArrowStyle::Async);
        assert_eq!(event, SequenceEvent::Divider(None));
    }

    #[test]
    fn test_diagram_keeps_declaration_order() {
        let mut diagram = Diagram::new()
            .with_participant("b", "Bob")
            .with_participant("a", "Alice");
        diagram.push(SequenceEvent::Spacer(5.0));

        let ids: Vec<String> = diagram
            .participants()
            .iter()
            .map(|participant| participant.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(diagram.participants()[1].display(), "Alice");
        assert_eq!(diagram.events(), &[SequenceEvent::Spacer(5.0)]);
    }
}
