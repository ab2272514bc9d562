mod matching;
pub mod recommender;
mod stop_words;
pub mod storage;
mod vectorizer;
