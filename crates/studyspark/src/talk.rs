//! Talk room: a chosen coach and two message logs, one for the day and one
//! for the week.
//!
//! Each log starts with the coach's opening question. The coach answers
//! every student message with one line from a fixed list, picked by a seed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::store::{DAILY_TALK_KEY, WEEKLY_TALK_KEY};

pub const COACH_COUNT: usize = 6;

/// Pause before the coach answers
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

const DAILY_OPENING: &str = "今日はどんな学習をしましたか？何か新しいことを学びましたか？";
const WEEKLY_OPENING: &str = "今週の学習を振り返りましょう。どんな成果がありましたか？";

const DAILY_REPLIES: &[&str] = &[
    "なるほど、素晴らしい取り組みですね！",
    "その調子で頑張りましょう！",
    "どんな点が難しかったですか？",
    "今日の学習で一番印象に残ったことは何ですか？",
    "明日はどんなことに取り組む予定ですか？",
    "その考え方はとても良いですね。もう少し詳しく教えてください。",
    "素晴らしい進歩ですね！自分の成長を感じられましたか？",
];

const WEEKLY_REPLIES: &[&str] = &[
    "今週の取り組みを詳しく教えてください。どんな科目に力を入れましたか？",
    "素晴らしい進歩ですね！特に成長を感じた部分はどこですか？",
    "今週の学習で難しかったことはありますか？どのように乗り越えましたか？",
    "来週はどんな目標に取り組みたいですか？",
    "先週と比べて、どんな変化がありましたか？",
    "その調子です！自分の成長をしっかり認めることも大切ですよ。",
    "計画通りに進んでいますか？もし遅れがあれば、どう調整するか考えてみましょう。",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TalkError {
    #[error("coach must be between 0 and {max}, got {0}", max = COACH_COUNT - 1)]
    UnknownCoach(usize),

    #[error("message must not be empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachStyle {
    Male,
    Female,
    Neutral,
}

impl CoachStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachStyle::Male => "male",
            CoachStyle::Female => "female",
            CoachStyle::Neutral => "neutral",
        }
    }
}

/// Selected coach, stored as its index in the picker grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Coach(usize);

impl Coach {
    pub fn new(index: usize) -> Result<Self, TalkError> {
        if index >= COACH_COUNT {
            return Err(TalkError::UnknownCoach(index));
        }
        Ok(Self(index))
    }

    pub fn index(&self) -> usize {
        self.0
    }

    /// Two coaches of each style, in grid order
    pub fn style(&self) -> CoachStyle {
        match self.0 / 2 {
            0 => CoachStyle::Male,
            1 => CoachStyle::Female,
            _ => CoachStyle::Neutral,
        }
    }
}

impl TryFrom<usize> for Coach {
    type Error = TalkError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Coach::new(index)
    }
}

impl From<Coach> for usize {
    fn from(coach: Coach) -> usize {
        coach.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TalkKind {
    #[default]
    Daily,
    Weekly,
}

impl TalkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TalkKind::Daily => "daily",
            TalkKind::Weekly => "weekly",
        }
    }

    pub fn opening(&self) -> &'static str {
        match self {
            TalkKind::Daily => DAILY_OPENING,
            TalkKind::Weekly => WEEKLY_OPENING,
        }
    }

    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            TalkKind::Daily => DAILY_REPLIES,
            TalkKind::Weekly => WEEKLY_REPLIES,
        }
    }

    /// Key the log is saved under
    pub fn store_key(&self) -> &'static str {
        match self {
            TalkKind::Daily => DAILY_TALK_KEY,
            TalkKind::Weekly => WEEKLY_TALK_KEY,
        }
    }
}

impl fmt::Display for TalkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TalkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TalkKind::Daily),
            "weekly" => Ok(TalkKind::Weekly),
            other => Err(format!("unknown talk: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Coach,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One conversation, oldest message first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkLog {
    pub kind: TalkKind,
    pub messages: Vec<Message>,
}

impl TalkLog {
    /// A fresh log holding only the coach's opening question
    pub fn new(kind: TalkKind, now: DateTime<Utc>) -> Self {
        let mut log = Self {
            kind,
            messages: Vec::new(),
        };
        log.push(Sender::Coach, kind.opening().to_string(), now);
        log
    }

    /// Add a student message. Blank text is rejected.
    pub fn send(&mut self, text: &str, now: DateTime<Utc>) -> Result<&Message, TalkError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TalkError::EmptyMessage);
        }
        Ok(self.push(Sender::User, text.to_string(), now))
    }

    /// Add the coach's answer chosen by `seed`
    pub fn reply(&mut self, seed: u64, now: DateTime<Utc>) -> &Message {
        let text = coach_reply(self.kind, seed).to_string();
        self.push(Sender::Coach, text, now)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn push(&mut self, sender: Sender, text: String, now: DateTime<Utc>) -> &Message {
        // Ids count up from 1 in the order messages were added
        let id = (self.messages.len() + 1).to_string();
        debug!(kind = %self.kind, id = %id, "Talk message added");
        self.messages.push(Message {
            id,
            sender,
            text,
            timestamp: now,
        });
        &self.messages[self.messages.len() - 1]
    }
}

/// Canned coach line for a conversation. The same seed always gives the
/// same line.
pub fn coach_reply(kind: TalkKind, seed: u64) -> &'static str {
    let replies = kind.replies();
    replies[(seed % replies.len() as u64) as usize]
}
