use super::matching::recommend;
use super::storage::{ProfileRecord, RecommendationSet, Storage};
use super::vectorizer::VectorSpaceModel;
use crate::catalog::{Course, UserProfile};
use crate::error::RecommendError;
use crate::TOP_N;
use std::time::Instant;

/// Profile fields to overwrite. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub career_goals: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub job_role: Option<String>,
    pub interested_courses: Option<String>,
    pub liked_courses: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        !self.touches_ranking()
            && self.name.is_none()
            && self.age.is_none()
            && self.job_role.is_none()
            && self.interested_courses.is_none()
            && self.liked_courses.is_none()
    }

    pub fn touches_ranking(&self) -> bool {
        self.career_goals.is_some() || self.skills.is_some() || self.interests.is_some()
    }

    fn apply(self, record: &mut ProfileRecord) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        set(&mut record.career_goals, self.career_goals);
        set(&mut record.skills, self.skills);
        set(&mut record.interests, self.interests);
        set(&mut record.name, self.name);
        set(&mut record.age, self.age);
        set(&mut record.job_role, self.job_role);
        set(&mut record.interested_courses, self.interested_courses);
        set(&mut record.liked_courses, self.liked_courses);
    }
}

/// Frozen catalog plus its vector space. Built once, then shared read-only.
pub struct Recommender {
    courses: Vec<Course>,
    model: VectorSpaceModel,
    pub storage: Storage,
}

impl Recommender {
    pub fn new(courses: Vec<Course>, storage: Storage) -> Self {
        let start = Instant::now();
        let profiles = courses.iter().map(Course::profile).collect::<Vec<_>>();
        let model = VectorSpaceModel::fit(&profiles);
        if model.is_empty() {
            warn!("course catalog is empty, every recommendation will be empty");
        }
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "recommender init, courses: {}, terms: {}, fit spends {}s",
            model.len(),
            model.dimension(),
            elapsed
        );

        Self {
            courses,
            model,
            storage,
        }
    }

    pub fn compute_recommendations(&self, profile: &UserProfile, top_n: usize) -> Vec<Course> {
        self.rank_text(&profile.profile(), top_n)
    }

    pub fn rank_text(&self, text: &str, top_n: usize) -> Vec<Course> {
        let query = self.model.transform(text);
        if query.is_zero() {
            debug!("query has no catalog terms, ranking falls back to ordinal order");
        }
        recommend(&query, self.model.matrix(), &self.courses, top_n)
    }

    pub fn get_course(&self, ordinal: usize) -> Result<&Course, RecommendError> {
        self.courses
            .get(ordinal)
            .ok_or(RecommendError::CourseNotFound(ordinal))
    }

    pub async fn profile(&self, user_id: u64) -> Result<Option<ProfileRecord>, RecommendError> {
        Ok(self.storage.get_profile(user_id).await?)
    }

    /// Recompute the user's set from the stored profile and replace the stored set.
    pub async fn refresh(&self, user_id: u64) -> Result<RecommendationSet, RecommendError> {
        let start = Instant::now();
        let profile = self
            .storage
            .get_profile(user_id)
            .await?
            .as_ref()
            .map(UserProfile::from)
            .unwrap_or_default();

        let top_n = *TOP_N;
        let set = RecommendationSet {
            user_id,
            courses: self.compute_recommendations(&profile, top_n),
            top_n,
        };
        for course in set.courses.iter() {
            debug!("user_id: {} recommended {}", user_id, course);
        }
        self.storage.upsert(user_id, &set).await?;
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "refresh user_id: {}, {} courses, spends {}s",
            user_id,
            set.courses.len(),
            elapsed
        );

        Ok(set)
    }

    /// The stored set, computed and stored first if the user has none yet.
    pub async fn recommendations(&self, user_id: u64) -> Result<RecommendationSet, RecommendError> {
        match self.storage.get(user_id).await? {
            Some(set) => {
                debug!("user_id: {} has stored recommendations", user_id);
                Ok(set)
            }
            None => self.refresh(user_id).await,
        }
    }

    /// Merge `update` into the stored profile. Returns the new set when a ranking
    /// field changed.
    pub async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<Option<RecommendationSet>, RecommendError> {
        if update.is_empty() {
            return Err(RecommendError::EmptyUpdate);
        }
        let touches_ranking = update.touches_ranking();

        let mut record = self
            .storage
            .get_profile(user_id)
            .await?
            .unwrap_or_default();
        update.apply(&mut record);
        self.storage.put_profile(user_id, &record).await?;
        info!("profile updated, user_id: {}", user_id);

        if touches_ranking {
            Ok(Some(self.refresh(user_id).await?))
        } else {
            Ok(None)
        }
    }
}
