use crate::api::LeaderboardEntry;

pub const EMPTY_LEADERBOARD_TEXT: &str = "Nenhuma pontuação ainda";
pub const LEADERBOARD_ERROR_TEXT: &str = "Erro ao carregar leaderboard";
pub const SCORE_SAVE_ERROR_TEXT: &str = "Erro ao salvar pontuação";
pub const REGISTERED_TEXT: &str = "Registro realizado com sucesso! Faça login para jogar.";

pub fn score_saved_text(score: u32) -> String {
    format!("Pontuação de {score} salva!")
}

pub fn welcome_text(username: &str) -> String {
    format!("Bem-vindo, {username}!")
}

pub fn connection_error_text(detail: &str) -> String {
    format!("Erro de conexão: {detail}")
}

/// What the leaderboard panel currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeaderboardView {
    #[default]
    NotLoaded,
    Entries(Vec<LeaderboardEntry>),
    Failed,
}

/// Best score and leaderboard as last fetched from the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    best_score: Option<u32>,
    leaderboard: LeaderboardView,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_score(&self) -> Option<u32> {
        self.best_score
    }

    /// `None` means the service has no best score for the user yet.
    pub fn set_best_score(&mut self, score: Option<u32>) {
        self.best_score = score;
    }

    /// Best score as displayed; `0` when there is none.
    pub fn best_score_text(&self) -> String {
        self.best_score.unwrap_or(0).to_string()
    }

    pub fn leaderboard(&self) -> &LeaderboardView {
        &self.leaderboard
    }

    pub fn set_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        self.leaderboard = LeaderboardView::Entries(entries);
    }

    pub fn leaderboard_failed(&mut self) {
        self.leaderboard = LeaderboardView::Failed;
    }

    /// Leaderboard panel rows, one per entry, or a single placeholder line.
    pub fn leaderboard_lines(&self) -> Vec<String> {
        match &self.leaderboard {
            LeaderboardView::NotLoaded => Vec::new(),
            LeaderboardView::Failed => vec![LEADERBOARD_ERROR_TEXT.to_string()],
            LeaderboardView::Entries(entries) if entries.is_empty() => {
                vec![EMPTY_LEADERBOARD_TEXT.to_string()]
            },
            LeaderboardView::Entries(entries) => entries
                .iter()
                .map(|e| format!("#{} {} {}", e.rank, e.username, e.score))
                .collect(),
        }
    }

    /// Forget everything, as on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: u32, name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            username: name.to_string(),
            score,
        }
    }

    #[test]
    fn best_score_defaults_to_zero() {
        let mut board = Scoreboard::new();
        assert_eq!(board.best_score_text(), "0");
        board.set_best_score(Some(70));
        assert_eq!(board.best_score_text(), "70");
        board.set_best_score(None);
        assert_eq!(board.best_score_text(), "0");
    }

    #[test]
    fn empty_leaderboard_placeholder() {
        let mut board = Scoreboard::new();
        assert!(board.leaderboard_lines().is_empty());
        board.set_leaderboard(Vec::new());
        assert_eq!(board.leaderboard_lines(), vec![EMPTY_LEADERBOARD_TEXT]);
    }

    #[test]
    fn failed_leaderboard_placeholder() {
        let mut board = Scoreboard::new();
        board.set_leaderboard(vec![entry(1, "a", 10)]);
        board.leaderboard_failed();
        assert_eq!(board.leaderboard_lines(), vec![LEADERBOARD_ERROR_TEXT]);
    }

    #[test]
    fn entries_render_rank_name_score() {
        let mut board = Scoreboard::new();
        board.set_leaderboard(vec![entry(1, "ana", 120), entry(2, "rui", 80)]);
        assert_eq!(board.leaderboard_lines(), vec!["#1 ana 120", "#2 rui 80"]);
    }

    #[test]
    fn message_texts() {
        assert_eq!(score_saved_text(40), "Pontuação de 40 salva!");
        assert_eq!(welcome_text("ana"), "Bem-vindo, ana!");
    }
}
