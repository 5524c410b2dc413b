use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Activity, Plan};

const ACTIVITIES_FILE: &str = "activities.txt";
const PLAN_PREFIX: &str = "week_plan_";

pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Store {
            data_dir: data_dir.into(),
        }
    }

    pub fn activities_path(&self) -> PathBuf {
        self.data_dir.join(ACTIVITIES_FILE)
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.data_dir.join("plans")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn load_activities(&self) -> Result<Vec<Activity>> {
        let path = self.activities_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let mut activities = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            // The activity name may itself contain commas, so only the
            // final field is the priority.
            let (name, priority) = line.rsplit_once(',').with_context(|| {
                format!("{}:{}: missing priority field", path.display(), lineno + 1)
            })?;
            let priority = priority.trim().parse::<u32>().with_context(|| {
                format!(
                    "{}:{}: invalid priority '{}'",
                    path.display(),
                    lineno + 1,
                    priority
                )
            })?;
            activities.push(Activity {
                name: name.to_string(),
                priority,
            });
        }
        Ok(activities)
    }

    pub fn save_activities(&self, activities: &[Activity]) -> Result<()> {
        let path = self.activities_path();
        let mut out = String::new();
        for activity in activities {
            out.push_str(&format!("{},{}\n", activity.name, activity.priority));
        }
        fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn add_activity(&self, name: &str, priority: u32) -> Result<()> {
        let mut activities = self.load_activities()?;
        if activities.iter().any(|a| a.name == name) {
            bail!("activity '{}' already exists", name);
        }
        activities.push(Activity {
            name: name.to_string(),
            priority,
        });
        self.save_activities(&activities)
    }

    pub fn remove_activity(&self, name: &str) -> Result<bool> {
        let mut activities = self.load_activities()?;
        let before = activities.len();
        activities.retain(|a| a.name != name);
        if activities.len() == before {
            return Ok(false);
        }
        self.save_activities(&activities)?;
        Ok(true)
    }

    /// Plans sorted by embedded date, most recent first.
    pub fn load_plans(&self) -> Result<Vec<Plan>> {
        let dir = self.plans_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut plans = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            let Some(date) = plan_date(&filename) else {
                log::warn!("skipping unrecognised plan file: {}", filename);
                continue;
            };
            plans.push(read_plan(&entry.path(), date)?);
        }

        plans.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(plans)
    }

    /// Exported plan filenames, most recent first.
    pub fn plan_files(&self) -> Result<Vec<String>> {
        let dir = self.plans_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| plan_date(name).is_some())
            .collect();
        files.sort_by(|a, b| b.cmp(a));
        Ok(files)
    }

    pub fn write_plan(&self, date: NaiveDate, entries: &[(String, String)]) -> Result<PathBuf> {
        let dir = self.plans_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join(format!("{}{}.txt", PLAN_PREFIX, date.format("%Y-%m-%d")));
        let mut out = String::new();
        for (day, activity) in entries {
            out.push_str(&format!("{}: {}\n", day, activity));
        }
        fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("exported plan to {}", path.display());
        Ok(path)
    }
}

fn plan_date(filename: &str) -> Option<NaiveDate> {
    let stem = filename.strip_prefix(PLAN_PREFIX)?.strip_suffix(".txt")?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

fn read_plan(path: &Path, date: NaiveDate) -> Result<Plan> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((day, activity)) = line.split_once(':') else {
            log::warn!("{}: skipping malformed line: {}", path.display(), line);
            continue;
        };
        entries.push((day.trim().to_string(), activity.trim().to_string()));
    }
    Ok(Plan { date, entries })
}
