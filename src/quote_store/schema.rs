//! SQLite schema definitions for the quotes database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, VirtualTable};

// =============================================================================
// Version 1 - Quotes
// =============================================================================

const QUOTES_TABLE_V1: Table = Table {
    name: "quotes",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("text", &SqlType::Text, non_null = true),
        sqlite_column!("author", &SqlType::Text, non_null = true),
        sqlite_column!("song", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("source", &SqlType::Text, non_null = true),
        // JSON array
        sqlite_column!(
            "tags",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
        sqlite_column!(
            "popularity",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_quotes_created_at", "created_at DESC"),
        ("idx_quotes_text_song", "text, song"),
        ("idx_quotes_source_active", "source, is_active"),
    ],
};

// =============================================================================
// Version 2 - Full-text index
// =============================================================================

/// Trigram tokenizer so that any substring of three or more characters matches.
const QUOTES_FTS_V2: VirtualTable = VirtualTable {
    name: "quotes_fts",
    create_sql: "CREATE VIRTUAL TABLE quotes_fts USING fts5(
        quote_id UNINDEXED,
        text,
        song,
        album,
        tokenize='trigram'
    );",
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute_batch(QUOTES_FTS_V2.create_sql)?;
    conn.execute(
        "INSERT INTO quotes_fts (quote_id, text, song, album)
         SELECT id, text, song, COALESCE(album, '') FROM quotes",
        [],
    )?;
    Ok(())
}

pub const QUOTES_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[QUOTES_TABLE_V1],
        virtual_tables: &[],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[QUOTES_TABLE_V1],
        virtual_tables: &[QUOTES_FTS_V2],
        migration: Some(migrate_v1_to_v2),
    },
];
