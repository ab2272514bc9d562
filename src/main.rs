mod catalog;
mod error;
mod knowledge;

use crate::catalog::{load_courses, Columns};
use crate::knowledge::recommender::{ProfileUpdate, Recommender};
use crate::knowledge::storage::{RecommendationSet, Storage};
use anyhow::{anyhow, Result};
use dotenv::dotenv;
use env_logger::Builder;
use futures::future::join_all;
use lazy_static::lazy_static;
use log::LevelFilter;
use serde::Serialize;
use std::sync::Arc;
use structopt::StructOpt;

#[macro_use]
extern crate log;

lazy_static! {
    static ref TOP_N: usize = parse_top_n(&env_or("TOP_N", "5"));
    static ref CORPUS_PATH: String = env_or("CORPUS_PATH", "CourseraDataset-Clean.csv");
    static ref STORAGE_DIR: String = env_or("STORAGE_DIR", "./storage");
    static ref TITLE_COLUMN: String = env_or("TITLE_COLUMN", "Course Title");
    static ref DESCRIPTION_COLUMN: String = env_or("DESCRIPTION_COLUMN", "What you will learn");
    static ref KEYWORD_COLUMN: String = env_or("KEYWORD_COLUMN", "Keyword");
}

const DEFAULT_TOP_N: usize = 5;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_top_n(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(top_n) => top_n,
        Err(e) => {
            warn!(
                "TOP_N {:?} is not a valid count ({}), using {}",
                raw, e, DEFAULT_TOP_N
            );
            DEFAULT_TOP_N
        }
    }
}

/// Content based course recommendations.
#[derive(StructOpt, Debug)]
struct Args {
    /// Print indented JSON.
    #[structopt(long)]
    pretty: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Print the stored recommendations of each user, computing missing ones.
    Recommend { user_ids: Vec<u64> },
    /// Recompute and store the recommendations of each user.
    Refresh { user_ids: Vec<u64> },
    /// Update profile fields of a user.
    Profile {
        user_id: u64,
        #[structopt(long)]
        career_goals: Option<String>,
        #[structopt(long)]
        skills: Option<String>,
        #[structopt(long)]
        interests: Option<String>,
        #[structopt(long)]
        name: Option<String>,
        #[structopt(long)]
        age: Option<u32>,
        #[structopt(long)]
        job_role: Option<String>,
        #[structopt(long)]
        interested_courses: Option<String>,
        #[structopt(long)]
        liked_courses: Option<String>,
    },
    /// Print the stored profile of a user.
    ShowProfile { user_id: u64 },
    /// Print one course of the catalog.
    Course { ordinal: usize },
    /// Rank the catalog against free text.
    Query {
        #[structopt(short, long)]
        top_n: Option<usize>,
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // read .env
    dotenv().ok();

    // init logger
    let log_level = std::env::var("RUST_LOG").unwrap_or_default();

    if log_level == "debug" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("courserec::knowledge"), LevelFilter::Debug)
            .filter(Some("courserec"), LevelFilter::Debug)
            .init();
    } else if log_level == "info" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("courserec::knowledge"), LevelFilter::Info)
            .filter(Some("courserec"), LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let args = Args::from_args();
    lazy_static::initialize(&TOP_N);

    // catalog and vector space are built once, before any request
    let courses = load_courses(CORPUS_PATH.as_str(), &Columns::from_env())?;
    let storage = Storage::new(&STORAGE_DIR)?;
    let recommender = Arc::new(Recommender::new(courses, storage));

    match args.command {
        Command::Recommend { user_ids } => {
            let sets = for_each_user(&recommender, user_ids, false).await?;
            print(&sets, args.pretty)?;
        }
        Command::Refresh { user_ids } => {
            let sets = for_each_user(&recommender, user_ids, true).await?;
            print(&sets, args.pretty)?;
        }
        Command::Profile {
            user_id,
            career_goals,
            skills,
            interests,
            name,
            age,
            job_role,
            interested_courses,
            liked_courses,
        } => {
            let update = ProfileUpdate {
                career_goals,
                skills,
                interests,
                name,
                age,
                job_role,
                interested_courses,
                liked_courses,
            };
            match recommender.update_profile(user_id, update).await? {
                Some(set) => print(&set, args.pretty)?,
                None => info!("profile of user_id: {} updated", user_id),
            }
        }
        Command::ShowProfile { user_id } => {
            let profile = recommender.profile(user_id).await?.unwrap_or_default();
            print(&profile, args.pretty)?;
        }
        Command::Course { ordinal } => {
            print(recommender.get_course(ordinal)?, args.pretty)?;
        }
        Command::Query { top_n, text } => {
            let courses = recommender.rank_text(&text, top_n.unwrap_or(*TOP_N));
            print(&courses, args.pretty)?;
        }
    }

    Ok(())
}

// one task per user, all sharing the same recommender. Fails if any user fails.
async fn for_each_user(
    recommender: &Arc<Recommender>,
    user_ids: Vec<u64>,
    refresh: bool,
) -> Result<Vec<RecommendationSet>> {
    let handles = user_ids.iter().map(|&user_id| {
        let recommender = Arc::clone(recommender);
        tokio::spawn(async move {
            if refresh {
                recommender.refresh(user_id).await
            } else {
                recommender.recommendations(user_id).await
            }
        })
    });
    let results = join_all(handles).await;

    let mut sets = Vec::with_capacity(results.len());
    let mut failed = vec![];
    for (user_id, joined) in user_ids.iter().zip(results) {
        match joined {
            Ok(Ok(set)) => sets.push(set),
            Ok(Err(e)) => {
                warn!("recommendations for user_id: {} failed: {}", user_id, e);
                failed.push(*user_id);
            }
            Err(e) => {
                warn!("recommendation task for user_id: {} failed: {}", user_id, e);
                failed.push(*user_id);
            }
        }
    }
    if !failed.is_empty() {
        return Err(anyhow!(
            "recommendations unavailable for user_ids: {:?}",
            failed
        ));
    }

    Ok(sets)
}

fn print<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Course;
    use tempfile::TempDir;

    fn recommender() -> (TempDir, Arc<Recommender>) {
        let dir = TempDir::new().expect("temp dir");
        let storage = Storage::new(dir.path().to_str().expect("utf-8 path")).expect("open storage");
        let courses = vec![
            Course::new(0, "python programming", "", ""),
            Course::new(1, "cooking basics", "", ""),
        ];
        (dir, Arc::new(Recommender::new(courses, storage)))
    }

    #[tokio::test]
    async fn every_user_gets_a_set() {
        let (_dir, rec) = recommender();
        let sets = for_each_user(&rec, vec![1, 2, 3], false).await.unwrap();
        assert_eq!(
            sets.iter().map(|s| s.user_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let (_dir, rec) = recommender();
        rec.storage
            .operator
            .write("recommendations/1", b"not json".to_vec())
            .await
            .unwrap();

        let err = for_each_user(&rec, vec![1, 2], false).await.unwrap_err();
        assert!(err.to_string().contains("[1]"));
        assert!(for_each_user(&rec, vec![2], false).await.is_ok());
    }

    #[test]
    fn top_n_setting() {
        assert_eq!(parse_top_n("3"), 3);
        assert_eq!(parse_top_n(" 12 "), 12);
        assert_eq!(parse_top_n("five"), DEFAULT_TOP_N);
        assert_eq!(parse_top_n("-1"), DEFAULT_TOP_N);
    }
}
