use super::models::{
    format_timestamp, parse_timestamp, NewQuote, Quote, QuoteSource, QuoteStats, QuotesPage,
    SourceCount, YearCount,
};
use super::schema::QUOTES_VERSIONED_SCHEMAS;
use super::QuoteStore;
use crate::sqlite_persistence::{migrate, read_schema_version};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Queries shorter than this cannot match a trigram index.
const MIN_FTS_QUERY_CHARS: usize = 3;

pub struct SqliteQuoteStore {
    conn: Mutex<Connection>,
}

impl SqliteQuoteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open quotes database")?;
        let latest_schema = QUOTES_VERSIONED_SCHEMAS
            .last()
            .context("No quotes schema defined")?;

        if is_new_db {
            info!("Creating new quotes database at {:?}", path);
            latest_schema.create(&conn)?;
        } else {
            let db_version = read_schema_version(&conn)?;
            let schema = QUOTES_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version == db_version)
                .with_context(|| format!("Unknown quotes database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Quotes database schema validation failed for version {}",
                    db_version
                )
            })?;

            if db_version < latest_schema.version {
                info!(
                    "Migrating quotes database from version {} to {}",
                    db_version, latest_schema.version
                );
                migrate(&mut conn, QUOTES_VERSIONED_SCHEMAS, db_version)?;
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Quotes database lock poisoned"))
    }

    /// Rows written by older versions may carry a source we no longer know;
    /// those are read as `Manual` everywhere.
    fn parse_source(source: &str, context: &str) -> QuoteSource {
        QuoteSource::parse(source).unwrap_or_else(|| {
            warn!("{} has unknown source '{}'", context, source);
            QuoteSource::Manual
        })
    }

    fn row_to_quote(row: &rusqlite::Row) -> rusqlite::Result<Quote> {
        let id: String = row.get("id")?;
        let source_str: String = row.get("source")?;
        let source = Self::parse_source(&source_str, &format!("Quote {}", id));
        let tags_str: String = row.get("tags")?;
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Quote {
            text: row.get("text")?,
            author: row.get("author")?,
            song: row.get("song")?,
            album: row.get("album")?,
            year: row.get("year")?,
            source,
            tags: serde_json::from_str(&tags_str).unwrap_or_default(),
            popularity: row.get("popularity")?,
            is_active: row.get::<_, i64>("is_active")? == 1,
            created_at: parse_timestamp(&created_at_str).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&updated_at_str).unwrap_or_else(Utc::now),
            id,
        })
    }

    fn query_quotes<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<Quote>> {
        let mut stmt = conn.prepare(sql)?;
        let quotes = stmt
            .query_map(params, Self::row_to_quote)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quotes)
    }

    fn get_quote(conn: &Connection, id: &str) -> Result<Option<Quote>> {
        let quote = conn
            .query_row(
                "SELECT * FROM quotes WHERE id = ?1",
                params![id],
                Self::row_to_quote,
            )
            .optional()?;
        Ok(quote)
    }

    fn insert_locked(conn: &mut Connection, quote: NewQuote) -> Result<Quote> {
        let quote = quote.into_quote(Utc::now());
        let tags = serde_json::to_string(&quote.tags)?;
        let timestamp = format_timestamp(&quote.created_at);

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO quotes (id, text, author, song, album, year, source, tags, popularity, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 1, ?9, ?9)",
            params![
                quote.id,
                quote.text,
                quote.author,
                quote.song,
                quote.album,
                quote.year,
                quote.source.as_str(),
                tags,
                timestamp,
            ],
        )?;
        tx.execute(
            "INSERT INTO quotes_fts (quote_id, text, song, album) VALUES (?1, ?2, ?3, ?4)",
            params![
                quote.id,
                quote.text,
                quote.song,
                quote.album.as_deref().unwrap_or("")
            ],
        )?;
        tx.commit()?;
        Ok(quote)
    }

    fn count(conn: &Connection, sql: &str) -> Result<usize> {
        let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl QuoteStore for SqliteQuoteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn random_quote(&self) -> Result<Option<Quote>> {
        let conn = self.conn()?;
        let quote = conn
            .query_row(
                "SELECT * FROM quotes WHERE is_active = 1 ORDER BY RANDOM() LIMIT 1",
                [],
                Self::row_to_quote,
            )
            .optional()?;
        Ok(quote)
    }

    fn list_quotes(&self, page: usize, limit: usize) -> Result<QuotesPage> {
        if page == 0 || limit == 0 {
            bail!("Page and limit must be positive, got {} and {}", page, limit);
        }
        let conn = self.conn()?;
        let total = Self::count(&conn, "SELECT COUNT(*) FROM quotes WHERE is_active = 1")?;
        let quotes = Self::query_quotes(
            &conn,
            "SELECT * FROM quotes WHERE is_active = 1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1 OFFSET ?2",
            params![limit as i64, ((page - 1) * limit) as i64],
        )?;
        Ok(QuotesPage { quotes, total })
    }

    fn quotes_by_song(&self, song: &str) -> Result<Vec<Quote>> {
        let conn = self.conn()?;
        Self::query_quotes(
            &conn,
            "SELECT * FROM quotes
             WHERE is_active = 1 AND instr(lower(song), lower(?1)) > 0
             ORDER BY popularity DESC, created_at DESC, rowid DESC",
            params![song],
        )
    }

    fn search_quotes(&self, query: &str) -> Result<Vec<Quote>> {
        let query = query.trim();
        let conn = self.conn()?;

        if query.chars().count() >= MIN_FTS_QUERY_CHARS {
            // Phrase query, so FTS5 operators in user input are taken literally
            let escaped_query = query.replace('"', "\"\"");
            return Self::query_quotes(
                &conn,
                "SELECT q.* FROM quotes_fts
                 JOIN quotes q ON q.id = quotes_fts.quote_id
                 WHERE quotes_fts MATCH ?1 AND q.is_active = 1
                 ORDER BY bm25(quotes_fts), q.rowid",
                params![format!("\"{}\"", escaped_query)],
            );
        }

        Self::query_quotes(
            &conn,
            "SELECT * FROM quotes
             WHERE is_active = 1 AND (
                instr(lower(text), lower(?1)) > 0
                OR instr(lower(song), lower(?1)) > 0
                OR instr(lower(COALESCE(album, '')), lower(?1)) > 0
             )
             ORDER BY rowid",
            params![query],
        )
    }

    fn stats(&self) -> Result<QuoteStats> {
        let conn = self.conn()?;
        let total_quotes = Self::count(&conn, "SELECT COUNT(*) FROM quotes WHERE is_active = 1")?;
        let total_songs = Self::count(
            &conn,
            "SELECT COUNT(DISTINCT song) FROM quotes WHERE is_active = 1",
        )?;
        let total_albums = Self::count(
            &conn,
            "SELECT COUNT(DISTINCT album) FROM quotes WHERE is_active = 1",
        )?;

        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) FROM quotes WHERE is_active = 1 GROUP BY source",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut source_stats: Vec<SourceCount> = vec![];
        for (source_str, count) in rows {
            let source = Self::parse_source(&source_str, "Stats row");
            match source_stats.iter_mut().find(|s| s.source == source) {
                Some(existing) => existing.count += count,
                None => source_stats.push(SourceCount { source, count }),
            }
        }
        source_stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.source.as_str().cmp(b.source.as_str()))
        });

        let mut stmt = conn.prepare(
            "SELECT year, COUNT(*) FROM quotes WHERE is_active = 1 AND year IS NOT NULL
             GROUP BY year ORDER BY year DESC",
        )?;
        let year_stats = stmt
            .query_map([], |row| {
                Ok(YearCount {
                    year: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuoteStats {
            total_quotes,
            total_songs,
            total_albums,
            source_stats,
            year_stats,
        })
    }

    fn insert_quote(&self, quote: NewQuote) -> Result<Quote> {
        let mut conn = self.conn()?;
        Self::insert_locked(&mut conn, quote).context("Failed to insert quote")
    }

    fn insert_quote_if_absent(&self, quote: NewQuote) -> Result<Option<Quote>> {
        let mut conn = self.conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM quotes WHERE text = ?1 AND song = ?2 LIMIT 1",
                params![quote.text, quote.song],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(None);
        }
        Self::insert_locked(&mut conn, quote)
            .context("Failed to insert quote")
            .map(Some)
    }

    fn increment_popularity(&self, id: &str) -> Result<Option<Quote>> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE quotes SET popularity = popularity + 1, updated_at = ?2
             WHERE id = ?1 AND is_active = 1",
            params![id, format_timestamp(&Utc::now())],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::get_quote(&conn, id)
    }

    fn deactivate_quote(&self, id: &str) -> Result<Option<Quote>> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE quotes SET is_active = 0, updated_at = ?2
             WHERE id = ?1 AND is_active = 1",
            params![id, format_timestamp(&Utc::now())],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::get_quote(&conn, id)
    }

    fn count_all_quotes(&self) -> Result<usize> {
        let conn = self.conn()?;
        Self::count(&conn, "SELECT COUNT(*) FROM quotes")
    }
}
