use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// A dialogue definition document.
///
/// The document is a graph: `start` names the entry node and every node may
/// reference others by id. Consumed by the timeline player; this crate only
/// models and validates the structure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterDef>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, DialogueNode>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

/// One node of the dialogue graph.
///
/// A node is a bag of optional parts rather than a strict sum type: authors
/// routinely combine `say` with `next`, or `set` with `signal`, in a single
/// node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub say: Option<SayBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choice: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub branch: Option<IfBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EndMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl DialogueNode {
    /// Whether playback stops here instead of following `next`.
    pub fn is_terminal(&self) -> bool {
        self.end.is_some() || self.jump.is_some() || !self.choice.is_empty()
    }
}

/// A spoken line: either bare text or text with an explicit speaker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SayBody {
    Line(String),
    Spoken {
        #[serde(default)]
        speaker: String,
        text: String,
    },
}

impl SayBody {
    pub fn text(&self) -> &str {
        match self {
            Self::Line(text) => text,
            Self::Spoken { text, .. } => text,
        }
    }

    pub fn speaker(&self) -> &str {
        match self {
            Self::Line(_) => "",
            Self::Spoken { speaker, .. } => speaker,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub next: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IfBody {
    pub condition: String,
    #[serde(rename = "then")]
    pub then_node: String,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_node: Option<String>,
}

/// `end: true` stops playback; `end: "label"` stops with a named outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndMarker {
    Flag(bool),
    Label(String),
}

/// `signal: name` or `signal: {name: ..., argument: ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalBody {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<serde_json::Value>,
    },
}

impl SignalBody {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { name, .. } => name,
        }
    }
}

impl DialogueDoc {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural validation: returns human-readable findings instead of
    /// failing hard, so an editor can show all of them at once. An empty
    /// list means the document is playable.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();

        if self.id.is_empty() {
            findings.push("Missing required field: 'id'".to_owned());
        }
        if self.start.is_empty() {
            findings.push("Missing required field: 'start'".to_owned());
        } else if !self.nodes.contains_key(&self.start) {
            findings.push(format!("Start node '{}' not found in nodes", self.start));
        }
        if self.nodes.is_empty() {
            findings.push("Missing required field: 'nodes' (or empty)".to_owned());
        }

        for (node_id, node) in &self.nodes {
            self.check_reference(&mut findings, node_id, "next", node.next.as_deref());
            self.check_reference(&mut findings, node_id, "jump", node.jump.as_deref());

            for (index, option) in node.choice.iter().enumerate() {
                if !option.next.is_empty() && !self.nodes.contains_key(&option.next) {
                    findings.push(format!(
                        "Node '{node_id}' choice {index}: references unknown node '{}'",
                        option.next
                    ));
                }
            }

            if let Some(branch) = &node.branch {
                self.check_reference(&mut findings, node_id, "then", Some(&branch.then_node));
                self.check_reference(&mut findings, node_id, "else", branch.else_node.as_deref());
            }
        }

        findings
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    fn check_reference(
        &self,
        findings: &mut Vec<String>,
        node_id: &str,
        field: &str,
        target: Option<&str>,
    ) {
        if let Some(target) = target {
            if !target.is_empty() && !self.nodes.contains_key(target) {
                findings.push(format!(
                    "Node '{node_id}': '{field}' references unknown node '{target}'"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
id: curator_intro
title: Meeting the Curator
characters:
  curator:
    name: The Curator
    portrait: portraits/curator.png
start: greeting
nodes:
  greeting:
    say:
      speaker: curator
      text: "Welcome to the gallery."
    next: offer
  offer:
    choice:
      - text: "Show me the paintings."
        next: tour
      - text: "I should leave."
        next: farewell
        condition: "not story.locked_in"
  tour:
    set:
      story.met_curator: true
    signal: start_tour
    next: farewell
  farewell:
    say: "Mind the frames."
    end: true
"#;

    #[test]
    fn sample_document_parses_and_validates() {
        let doc = DialogueDoc::from_yaml(SAMPLE).unwrap();
        assert_eq!(doc.id, "curator_intro");
        assert_eq!(doc.start, "greeting");
        assert_eq!(doc.nodes.len(), 4);
        assert!(doc.is_valid(), "{:?}", doc.validate());

        let greeting = &doc.nodes["greeting"];
        let say = greeting.say.as_ref().unwrap();
        assert_eq!(say.speaker(), "curator");
        assert_eq!(say.text(), "Welcome to the gallery.");
        assert!(!greeting.is_terminal());

        let farewell = &doc.nodes["farewell"];
        assert_eq!(farewell.say.as_ref().unwrap().text(), "Mind the frames.");
        assert_eq!(farewell.end, Some(EndMarker::Flag(true)));
        assert!(farewell.is_terminal());

        let tour = &doc.nodes["tour"];
        assert_eq!(tour.signal.as_ref().unwrap().name(), "start_tour");
        assert_eq!(tour.set["story.met_curator"], serde_json::json!(true));

        assert_eq!(
            doc.characters["curator"].portrait.as_deref(),
            Some("portraits/curator.png")
        );
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let doc = DialogueDoc::from_yaml("title: Broken").unwrap();
        let findings = doc.validate();
        assert!(findings.iter().any(|f| f.contains("'id'")));
        assert!(findings.iter().any(|f| f.contains("'start'")));
        assert!(findings.iter().any(|f| f.contains("'nodes'")));
    }

    #[test]
    fn unknown_references_are_findings_not_errors() {
        let doc = DialogueDoc::from_yaml(
            r#"
id: broken
start: missing_entry
nodes:
  a:
    say: "hello"
    next: nowhere
  b:
    choice:
      - text: "go"
        next: also_nowhere
"#,
        )
        .unwrap();

        let findings = doc.validate();
        assert!(findings.iter().any(|f| f.contains("missing_entry")));
        assert!(findings.iter().any(|f| f.contains("nowhere")));
        assert!(findings.iter().any(|f| f.contains("also_nowhere")));
        assert!(!doc.is_valid());
    }

    #[test]
    fn branch_references_are_checked() {
        let doc = DialogueDoc::from_yaml(
            r#"
id: branchy
start: gate
nodes:
  gate:
    if:
      condition: "story.met_curator"
      then: known
      else: missing_else
  known:
    end: "good"
"#,
        )
        .unwrap();

        let findings = doc.validate();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("missing_else"));

        assert_eq!(
            doc.nodes["known"].end,
            Some(EndMarker::Label("good".into()))
        );
    }

    #[test]
    fn json_round_trip_preserves_the_document() {
        let doc = DialogueDoc::from_yaml(SAMPLE).unwrap();
        let reloaded = DialogueDoc::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, doc);
    }

    #[test]
    fn detailed_signal_parses_with_argument() {
        let doc = DialogueDoc::from_yaml(
            r#"
id: sig
start: a
nodes:
  a:
    signal:
      name: shake_camera
      argument: 2.5
    end: true
"#,
        )
        .unwrap();

        let signal = doc.nodes["a"].signal.as_ref().unwrap();
        assert_eq!(signal.name(), "shake_camera");
        match signal {
            SignalBody::Detailed { argument, .. } => {
                assert_eq!(argument.as_ref().unwrap().as_f64(), Some(2.5));
            }
            SignalBody::Name(_) => panic!("expected detailed signal"),
        }
    }
}
