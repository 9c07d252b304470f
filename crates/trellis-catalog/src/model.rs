//! Module/lesson/challenge types: the primary course definables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Progression state of a module or lesson.
///
/// Statuses only move forward along
/// `locked → unlocked|todo → current → completed`; nothing in the engine
/// ever re-locks an entity within one learner's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Locked,
    Unlocked,
    Current,
    Completed,
    Todo,
}

impl Status {
    /// Whether the next-lesson unlock rule may promote this status.
    ///
    /// `current` and `completed` lessons are left untouched by unlocking.
    pub fn is_unlockable(self) -> bool {
        matches!(self, Status::Locked | Status::Todo)
    }

    /// String representation matching the persisted wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Locked => "locked",
            Status::Unlocked => "unlocked",
            Status::Current => "current",
            Status::Completed => "completed",
            Status::Todo => "todo",
        }
    }
}

/// Transient play state for interactive exercise UIs.
///
/// A display hint only. Never authoritative and never persisted; the
/// authoritative completion bit is `Challenge::completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    #[default]
    Idle,
    Playing,
    Correct,
    Incorrect,
}

/// A completable unit of work within a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Free-form discriminator for exercise-specific grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub play_state: PlayState,
}

impl Challenge {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            completed: false,
            target_alignment: None,
            completed_at: None,
            play_state: PlayState::Idle,
        }
    }

    /// A challenge synthesized for stage-level tracking: already completed,
    /// with no display description of its own.
    pub fn synthesized(id: impl Into<String>) -> Self {
        let mut challenge = Self::new(id, "");
        challenge.mark_completed();
        challenge
    }

    /// Set the completion bit, stamping `completed_at` on first completion.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }
}

/// A lesson: one routable page of content, with zero or more challenges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Routing address. Opaque to the engine.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<Challenge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
}

impl Lesson {
    pub fn challenge(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    pub fn challenge_mut(&mut self, id: &str) -> Option<&mut Challenge> {
        self.challenges.iter_mut().find(|c| c.id == id)
    }

    /// Whether every challenge carries the completion bit.
    ///
    /// Vacuously true for a lesson with zero challenges; the cascade only
    /// consults this after locating a concrete challenge, so zero-challenge
    /// lessons complete exclusively through whole-lesson completion.
    pub fn all_challenges_completed(&self) -> bool {
        self.challenges.iter().all(|c| c.completed)
    }
}

fn default_status() -> Status {
    Status::Locked
}

/// A module: an ordered run of lessons, optionally gated on another module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lessons: Vec<Lesson>,
    /// Prerequisite module id. The module leaves `locked` only once the
    /// prerequisite reaches `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

impl Module {
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn lesson_mut(&mut self, id: &str) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|l| l.id == id)
    }

    pub fn all_lessons_completed(&self) -> bool {
        self.lessons.iter().all(|l| l.status == Status::Completed)
    }
}
