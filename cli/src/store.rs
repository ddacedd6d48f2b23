use std::fmt;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sweeper_core::{Board, BoardError};
use thiserror::Error;

const ID_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const ID_LEN: usize = 18;

/// Identifier of a stored board, 18 base32 characters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..ID_LEN)
            .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid board id {0:?}, expected 18 characters of A-Z and 2-7")]
pub struct InvalidBoardId(String);

impl FromStr for BoardId {
    type Err = InvalidBoardId;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let id = s.to_ascii_uppercase();
        if id.len() == ID_LEN && id.bytes().all(|b| ID_ALPHABET.contains(&b)) {
            Ok(Self(id))
        } else {
            Err(InvalidBoardId(s.to_owned()))
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Board with id '{0}' not found")]
    NotFound(BoardId),
    #[error("Board '{0}' is being modified by another operation")]
    Locked(BoardId),
    #[error("Stored board '{0}' is corrupt: {1}")]
    Corrupt(BoardId, BoardError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Boards persisted as one JSON file each.
///
/// Mutations go through [`BoardStore::update`], which holds an exclusive lock
/// file for the board while it loads, applies and writes back.
#[derive(Clone, Debug)]
pub struct BoardStore {
    dir: PathBuf,
}

impl BoardStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("Board store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn create<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Result<BoardId> {
        let id = loop {
            let id = BoardId::generate(rng);
            if !self.board_path(&id).exists() {
                break id;
            }
        };
        let _lock = LockGuard::acquire(self.lock_path(&id), &id)?;
        self.save(&id, board)?;
        tracing::info!(%id, "Board created");
        Ok(id)
    }

    pub fn load(&self, id: &BoardId) -> Result<Board> {
        let text = match fs::read_to_string(self.board_path(id)) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        let board: Board = serde_json::from_str(&text)?;
        board
            .validate()
            .map_err(|err| StoreError::Corrupt(id.clone(), err))?;
        Ok(board)
    }

    /// Runs `f` on the stored board under an exclusive lock.
    ///
    /// The board is written back only when `f` succeeds.
    pub fn update<T, F>(&self, id: &BoardId, f: F) -> Result<(Board, T)>
    where
        F: FnOnce(&mut Board) -> std::result::Result<T, BoardError>,
    {
        let _lock = LockGuard::acquire(self.lock_path(id), id)?;
        let mut board = self.load(id)?;
        let value = f(&mut board)?;
        self.save(id, &board)?;
        tracing::debug!(%id, status = %board.status(), "Board updated");
        Ok((board, value))
    }

    pub fn list(&self) -> Result<Vec<BoardId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match stem.parse() {
                Ok(id) => ids.push(id),
                Err(err) => tracing::debug!("Skipping {}: {}", path.display(), err),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn save(&self, id: &BoardId, board: &Board) -> Result<()> {
        let path = self.board_path(id);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(board)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn board_path(&self, id: &BoardId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: &BoardId) -> PathBuf {
        self.dir.join(format!("{}.lock", id))
    }
}

/// Exclusive per-board lock on `<id>.lock`.
///
/// The lock belongs to the open file handle, so the OS drops it when the
/// holder exits for any reason. The file itself stays on disk.
struct LockGuard {
    file: File,
}

impl LockGuard {
    fn acquire(path: PathBuf, id: &BoardId) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        match file.try_lock() {
            Ok(()) => Ok(Self { file }),
            Err(TryLockError::WouldBlock) => Err(StoreError::Locked(id.clone())),
            Err(TryLockError::Error(err)) => Err(err.into()),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!("Could not release board lock: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sweeper_core::{BoardStatus, FlagOutcome, MineLayout, SystemClock};

    fn temp_store(name: &str) -> BoardStore {
        let dir = std::env::temp_dir().join(format!("sweeper-store-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        BoardStore::open(dir).unwrap()
    }

    fn sample_board() -> Board {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        Board::with_mine_layout(layout, &SystemClock).unwrap()
    }

    #[test]
    fn generated_ids_parse_back() {
        let mut rng = StdRng::seed_from_u64(9);
        let id = BoardId::generate(&mut rng);

        assert_eq!(id.as_str().len(), ID_LEN);
        assert_eq!(id.as_str().parse::<BoardId>(), Ok(id.clone()));
        assert_eq!(id.as_str().to_lowercase().parse::<BoardId>(), Ok(id));
    }

    #[test]
    fn rejects_path_like_ids() {
        assert!("../../etc/passwd".parse::<BoardId>().is_err());
        assert!("SHORT".parse::<BoardId>().is_err());
    }

    #[test]
    fn create_load_and_list() {
        let store = temp_store("create");
        let mut rng = StdRng::seed_from_u64(1);
        let board = sample_board();

        let id = store.create(&board, &mut rng).unwrap();

        assert_eq!(store.load(&id).unwrap(), board);
        assert_eq!(store.list().unwrap(), vec![id]);
    }

    #[test]
    fn update_saves_only_on_success() {
        let store = temp_store("update");
        let mut rng = StdRng::seed_from_u64(2);
        let id = store.create(&sample_board(), &mut rng).unwrap();

        let (board, ()) = store.update(&id, |board| board.pause(&SystemClock)).unwrap();
        assert_eq!(board.status(), BoardStatus::Paused);

        let err = store.update(&id, |board| board.pause(&SystemClock)).unwrap_err();
        assert!(matches!(err, StoreError::Board(BoardError::AlreadyPaused)));
        assert_eq!(store.load(&id).unwrap(), board);
    }

    #[test]
    fn locked_board_is_refused() {
        let store = temp_store("locked");
        let mut rng = StdRng::seed_from_u64(3);
        let id = store.create(&sample_board(), &mut rng).unwrap();

        let _held = LockGuard::acquire(store.lock_path(&id), &id).unwrap();
        let err = store.update(&id, |board| board.flag((1, 1))).unwrap_err();

        assert!(matches!(err, StoreError::Locked(_)));
    }

    #[test]
    fn lock_is_released_after_update() {
        let store = temp_store("released");
        let mut rng = StdRng::seed_from_u64(4);
        let id = store.create(&sample_board(), &mut rng).unwrap();

        store.update(&id, |board| board.flag((1, 1))).unwrap();
        let (board, _) = store.update(&id, |board| board.flag((1, 1))).unwrap();

        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn stale_lock_file_does_not_block() {
        let store = temp_store("stale");
        let mut rng = StdRng::seed_from_u64(5);
        let id = store.create(&sample_board(), &mut rng).unwrap();
        // left behind by a process that died mid-update
        fs::write(store.lock_path(&id), b"").unwrap();

        let (board, outcome) = store.update(&id, |board| board.flag((1, 1))).unwrap();

        assert_eq!(outcome, FlagOutcome::Flagged);
        assert_eq!(board.flag_count(), 1);
    }

    #[test]
    fn missing_board_is_not_found() {
        let store = temp_store("missing");
        let id: BoardId = "AAAAAAAAAAAAAAAAAA".parse().unwrap();

        assert!(matches!(store.load(&id), Err(StoreError::NotFound(_))));
    }
}
