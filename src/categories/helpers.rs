use rusqlite::{params, Connection};

use crate::internal_error::{InternalError, InternalResult};
use crate::users::data::UserID;

use super::data::*;

pub fn get_category_from_db(
    db_connection: &Connection,
    user_id: UserID,
    category_id: CategoryID,
) -> InternalResult<Category> {
    let category = db_connection.query_row(
        "SELECT name, is_default FROM categories WHERE rowid = ?1 AND user_id = ?2",
        params![category_id, user_id],
        |row| {
            Ok(Category {
                name: row.get(0)?,
                is_default: row.get(1)?,
            })
        },
    )?;

    Ok(category)
}

pub fn get_categories_from_db(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<Vec<(CategoryID, Category)>> {
    let mut statement = db_connection
        .prepare("SELECT rowid, name, is_default FROM categories WHERE user_id = ?1 ORDER BY rowid")?;

    let rows = statement.query_map(params![user_id], |row| {
        Ok((
            row.get(0)?,
            Category {
                name: row.get(1)?,
                is_default: row.get(2)?,
            },
        ))
    })?;

    let mut categories = vec![];
    for row_result in rows {
        categories.push(row_result?);
    }

    Ok(categories)
}

pub fn add_category_to_db(
    db_connection: &Connection,
    user_id: UserID,
    name: &str,
    is_default: bool,
) -> InternalResult<CategoryID> {
    if name.trim().is_empty() {
        return Err(InternalError::from("category name must not be empty"));
    }

    db_connection.execute(
        "INSERT INTO categories (user_id, name, is_default) VALUES (?1, ?2, ?3)",
        params![user_id, name, is_default],
    )?;

    Ok(db_connection.last_insert_rowid())
}

/// Every new account starts with the same seeded categories.
pub fn seed_default_categories(db_connection: &Connection, user_id: UserID) -> InternalResult<()> {
    for name in ["Work", "Personal"] {
        add_category_to_db(db_connection, user_id, name, true)?;
    }

    Ok(())
}

pub fn delete_category_from_db(
    db_connection: &mut Connection,
    user_id: UserID,
    category_id: CategoryID,
) -> InternalResult<()> {
    let tx = db_connection.transaction()?;

    get_category_from_db(&tx, user_id, category_id)?;

    // Owned tasks and their subtasks go with the category.
    tx.execute(
        "DELETE FROM subtasks WHERE task_id IN (SELECT rowid FROM tasks WHERE category_id = ?1)",
        params![category_id],
    )?;
    tx.execute("DELETE FROM tasks WHERE category_id = ?1", params![category_id])?;
    tx.execute("DELETE FROM categories WHERE rowid = ?1", params![category_id])?;

    tx.commit()?;

    Ok(())
}
