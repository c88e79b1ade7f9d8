//! Subcommands and their dispatch onto the store traits.
//!
//! Every command prints its result to stdout as pretty JSON.

use std::io::{self, BufRead as _, Write as _};

use anyhow::{Context as _, bail};
use askmate_core::{
  AnswerId, CommentId, QuestionId, UserId,
  account::NewAccount,
  age::time_since,
  answer::{Answer, NewAnswer},
  comment::{Comment, CommentTarget, NewComment},
  query::{SortField, SortOrder, VoteChange, VoteDirection},
  question::{NewQuestion, Question},
  store::ForumStore,
};
use chrono::Utc;
use clap::{ArgGroup, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

// ─── Command tree ────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create the database and schema if they do not exist yet.
  Init,

  /// Register an account; the password is read from stdin.
  Register {
    username:   String,
    email:      String,
    first_name: String,
    last_name:  String,
  },

  /// Check a password (read from stdin) against an account.
  Login { username: String },

  /// Manage the tag catalogue.
  #[command(subcommand)]
  Tag(TagCommand),

  /// Ask a question.
  Ask {
    title:   String,
    message: String,
    #[arg(long)]
    image:   Option<String>,
    #[arg(long)]
    author:  Option<UserId>,
    #[arg(long)]
    tag:     Option<String>,
  },

  /// Answer a question.
  Answer {
    question: QuestionId,
    message:  String,
    #[arg(long)]
    image:    Option<String>,
    #[arg(long)]
    author:   Option<UserId>,
  },

  /// Comment on a question or an answer.
  #[command(group(ArgGroup::new("target").required(true).args(["question", "answer"])))]
  Comment {
    message:  String,
    #[arg(long)]
    question: Option<QuestionId>,
    #[arg(long)]
    answer:   Option<AnswerId>,
    #[arg(long)]
    author:   Option<UserId>,
  },

  /// Show a question with its answers and comments. Counts as a view.
  Show { question: QuestionId },

  /// List all questions.
  List {
    /// date, title, message, views, votes or comments.
    #[arg(long, default_value = "date")]
    sort:  SortField,
    #[arg(long, default_value = "desc")]
    order: SortOrder,
  },

  /// The newest questions.
  Latest,

  /// Questions carrying a tag.
  Tagged { tag: String },

  /// Case-insensitive search over titles and tag names.
  Search { text: String },

  /// Cast or retract a vote.
  Vote {
    #[arg(value_enum)]
    post:      Votable,
    id:        i64,
    direction: VoteDirection,
    #[arg(long)]
    retract:   bool,
  },

  /// Mark an answer as the accepted one for its question.
  Accept { answer: AnswerId },

  /// Clear the accepted flag on an answer.
  Decline { answer: AnswerId },

  /// Delete a post and everything that depends on it.
  #[command(subcommand)]
  Delete(DeleteCommand),

  /// A user's reputation.
  Reputation { user: UserId },

  /// Answer and comment counts per question.
  Counts,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
  Add { name: String },
  List,
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
  Question { id: QuestionId },
  Answer { id: AnswerId },
  Comment { id: CommentId },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Votable {
  Question,
  Answer,
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct QuestionView {
  #[serde(flatten)]
  question: Question,
  age:      String,
  tag:      Option<String>,
  comments: Vec<CommentView>,
  answers:  Vec<AnswerView>,
}

#[derive(Serialize)]
struct AnswerView {
  #[serde(flatten)]
  answer:   Answer,
  age:      String,
  comments: Vec<CommentView>,
}

#[derive(Serialize)]
struct CommentView {
  #[serde(flatten)]
  comment: Comment,
  age:     String,
}

impl CommentView {
  fn from_comments(comments: Vec<Comment>) -> Vec<Self> {
    let now = Utc::now();
    comments
      .into_iter()
      .map(|comment| Self {
        age: time_since(comment.submission_time, now),
        comment,
      })
      .collect()
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run<S: ForumStore>(store: &S, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Init => {
      info!("schema ready");
      Ok(())
    }

    Command::Register { username, email, first_name, last_name } => {
      let password = read_password()?;
      let account = store
        .register_account(NewAccount { username, password, email, first_name, last_name })
        .await
        .context("failed to register account")?;
      print_json(&account)
    }

    Command::Login { username } => {
      let password = read_password()?;
      if !store.verify_login(username.clone(), password).await? {
        bail!("invalid username or password");
      }
      let account = store.get_account_by_username(username).await?;
      print_json(&account)
    }

    Command::Tag(TagCommand::Add { name }) => {
      let tag = store.create_tag(name).await.context("failed to create tag")?;
      print_json(&tag)
    }
    Command::Tag(TagCommand::List) => print_json(&store.list_tags().await?),

    Command::Ask { title, message, image, author, tag } => {
      let question = store
        .create_question(NewQuestion { title, message, image, author, tag })
        .await
        .context("failed to create question")?;
      print_json(&question)
    }

    Command::Answer { question, message, image, author } => {
      let answer = store
        .create_answer(NewAnswer { question_id: question, message, image, author })
        .await
        .context("failed to create answer")?;
      print_json(&answer)
    }

    Command::Comment { message, question, answer, author } => {
      let target = match (question, answer) {
        (Some(id), None) => CommentTarget::Question(id),
        (None, Some(id)) => CommentTarget::Answer(id),
        _ => bail!("a comment needs exactly one of --question or --answer"),
      };
      let comment = store
        .create_comment(NewComment { target, message, author })
        .await
        .context("failed to create comment")?;
      print_json(&comment)
    }

    Command::Show { question } => print_json(&show(store, question).await?),

    Command::List { sort, order } => {
      print_json(&store.sorted_questions(sort, order).await?)
    }
    Command::Latest => {
      print_json(&store.latest_questions(askmate_core::store::SHORT_LISTING_LIMIT).await?)
    }
    Command::Tagged { tag } => print_json(&store.questions_with_tag(tag).await?),
    Command::Search { text } => print_json(&store.search_questions(text).await?),

    Command::Vote { post, id, direction, retract } => {
      let change = if retract { VoteChange::Retract } else { VoteChange::Cast };
      match post {
        Votable::Question => {
          let id = QuestionId(id);
          store.vote_question(id, direction, change).await?;
          print_json(&store.get_question(id).await?)
        }
        Votable::Answer => {
          let id = AnswerId(id);
          store.vote_answer(id, direction, change).await?;
          print_json(&store.get_answer(id).await?)
        }
      }
    }

    Command::Accept { answer } => {
      store.accept_answer(answer).await?;
      print_json(&store.get_answer(answer).await?)
    }
    Command::Decline { answer } => {
      store.decline_answer(answer).await?;
      print_json(&store.get_answer(answer).await?)
    }

    Command::Delete(target) => {
      match &target {
        DeleteCommand::Question { id } => store.delete_question(*id).await?,
        DeleteCommand::Answer { id } => store.delete_answer(*id).await?,
        DeleteCommand::Comment { id } => store.delete_comment(*id).await?,
      }
      info!(?target, "deleted");
      Ok(())
    }

    Command::Reputation { user } => {
      let reputation = store.reputation(user).await?;
      print_json(&serde_json::json!({
        "reputation": reputation,
        "score": reputation.score(),
      }))
    }

    Command::Counts => {
      let answers = store.answer_counts().await?;
      let comments = store.comment_counts().await?;
      print_json(&serde_json::json!({
        "answers": answers,
        "comments": comments,
      }))
    }
  }
}

/// Assemble the full page for one question, bumping its view counter first.
async fn show<S: ForumStore>(store: &S, id: QuestionId) -> anyhow::Result<QuestionView> {
  store.record_view(id).await?;
  let question = store.get_question(id).await?;
  let tag = store.tag_for_question(id).await?;
  let comments = CommentView::from_comments(store.comments_for_question(id).await?);

  let now = Utc::now();
  let mut answers = Vec::new();
  for answer in store.answers_for_question(id).await? {
    let comments = CommentView::from_comments(store.comments_for_answer(answer.id).await?);
    answers.push(AnswerView {
      age: time_since(answer.submission_time, now),
      answer,
      comments,
    });
  }

  Ok(QuestionView {
    age: time_since(question.submission_time, now),
    question,
    tag,
    comments,
    answers,
  })
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
  println!("{text}");
  Ok(())
}

/// Read a password line from stdin. Input is echoed.
fn read_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
