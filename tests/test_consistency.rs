// Dual-table invariant tests: after any sequence of writes, the base table
// and its vec0 mirror hold the same rowid set, and each rowid's embedding
// bytes are identical in both. The mirror is only ever written by trigger
// cascade, so these tests exercise every mutation path the client has.

use std::collections::BTreeMap;

use sqlite_vec_client::{connect, DistanceMetric, RecordPatch, SqliteVecClient};
use tempfile::TempDir;

fn test_client() -> (TempDir, SqliteVecClient) {
    let dir = TempDir::new().unwrap();
    let client = SqliteVecClient::open("items", dir.path().join("sync.db")).unwrap();
    client.create_table(4, DistanceMetric::L2).unwrap();
    (dir, client)
}

/// Read (rowid -> embedding bytes) straight out of a table, bypassing the
/// client, so the check does not depend on the code under test.
fn dump(dir: &TempDir, table: &str) -> BTreeMap<i64, Vec<u8>> {
    let conn = connect(dir.path().join("sync.db")).unwrap();
    let mut stmt = conn
        .prepare(&format!("SELECT rowid, embedding FROM \"{table}\" ORDER BY rowid"))
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))
        .unwrap();
    rows.collect::<Result<BTreeMap<_, _>, _>>().unwrap()
}

fn assert_mirror_in_sync(dir: &TempDir) {
    let base = dump(dir, "items");
    let mirror = dump(dir, "items_vec");
    assert_eq!(
        base.keys().collect::<Vec<_>>(),
        mirror.keys().collect::<Vec<_>>(),
        "rowid sets diverged between base and mirror"
    );
    for (rowid, bytes) in &base {
        assert_eq!(
            bytes, &mirror[rowid],
            "embedding bytes differ for rowid {rowid}"
        );
    }
}

#[test]
fn test_insert_populates_mirror() {
    let (dir, client) = test_client();
    client
        .add(
            &vec!["a".to_string(), "b".to_string()],
            &vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]],
            None,
        )
        .unwrap();

    assert_mirror_in_sync(&dir);
    assert_eq!(dump(&dir, "items_vec").len(), 2);
}

#[test]
fn test_embedding_update_propagates() {
    let (dir, client) = test_client();
    let rowids = client
        .add(
            &vec!["a".to_string()],
            &vec![vec![1.0, 1.0, 1.0, 1.0]],
            None,
        )
        .unwrap();

    client
        .update(&RecordPatch::new(rowids[0]).embedding(vec![9.0, 8.0, 7.0, 6.0]))
        .unwrap();

    assert_mirror_in_sync(&dir);
    let hits = client.similarity_search(&[9.0, 8.0, 7.0, 6.0], 1).unwrap();
    assert_eq!(hits[0].distance, 0.0);
}

#[test]
fn test_text_only_update_leaves_mirror_untouched() {
    let (dir, client) = test_client();
    let rowids = client
        .add(
            &vec!["a".to_string()],
            &vec![vec![1.0, 2.0, 3.0, 4.0]],
            None,
        )
        .unwrap();
    let before = dump(&dir, "items_vec");

    client
        .update(&RecordPatch::new(rowids[0]).text("renamed"))
        .unwrap();

    assert_eq!(dump(&dir, "items_vec"), before);
    assert_mirror_in_sync(&dir);
}

#[test]
fn test_delete_removes_mirror_row() {
    let (dir, client) = test_client();
    let rowids = client
        .add(
            &vec!["a".to_string(), "b".to_string()],
            &vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]],
            None,
        )
        .unwrap();

    client.delete(rowids[0]).unwrap();

    assert_mirror_in_sync(&dir);
    let mirror = dump(&dir, "items_vec");
    assert_eq!(mirror.len(), 1);
    assert!(mirror.contains_key(&rowids[1]));
}

#[test]
fn test_mixed_mutation_sequence_keeps_invariant() {
    let (dir, client) = test_client();

    let n = 60;
    let texts: Vec<String> = (0..n).map(|i| format!("doc {i}")).collect();
    let embeddings: Vec<Vec<f32>> = (0..n)
        .map(|i| vec![i as f32, (i * 2) as f32, 0.5, -0.5])
        .collect();
    let rowids = client.add(&texts, &embeddings, None).unwrap();
    assert_mirror_in_sync(&dir);

    // Delete every third record.
    let victims: Vec<i64> = rowids.iter().copied().step_by(3).collect();
    client.delete_many(&victims).unwrap();
    assert_mirror_in_sync(&dir);

    // Update the embedding of every remaining even record.
    let patches: Vec<RecordPatch> = rowids
        .iter()
        .copied()
        .filter(|r| !victims.contains(r) && r % 2 == 0)
        .map(|r| RecordPatch::new(r).embedding(vec![-1.0, -2.0, -3.0, -4.0]))
        .collect();
    client.update_many(&patches).unwrap();
    assert_mirror_in_sync(&dir);

    // Insert a few more on top.
    client
        .add(
            &vec!["late one".to_string(), "late two".to_string()],
            &vec![vec![0.1, 0.2, 0.3, 0.4], vec![0.5, 0.6, 0.7, 0.8]],
            None,
        )
        .unwrap();
    assert_mirror_in_sync(&dir);
}

#[test]
fn test_clear_cascades_through_triggers() {
    let (dir, client) = test_client();
    client
        .add(
            &vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            None,
        )
        .unwrap();

    client.clear().unwrap();

    assert!(dump(&dir, "items").is_empty());
    assert!(dump(&dir, "items_vec").is_empty());
}

#[test]
fn test_rolled_back_transaction_leaves_both_tables_unchanged() {
    let (dir, client) = test_client();
    client
        .add(
            &vec!["keep".to_string()],
            &vec![vec![1.0, 2.0, 3.0, 4.0]],
            None,
        )
        .unwrap();
    let base_before = dump(&dir, "items");
    let mirror_before = dump(&dir, "items_vec");

    let result: Result<(), sqlite_vec_client::Error> = client.transaction(|c| {
        c.add(
            &vec!["phantom".to_string()],
            &vec![vec![0.0, 0.0, 0.0, 0.0]],
            None,
        )?;
        c.clear()?;
        Err(sqlite_vec_client::Error::Validation("abort".to_string()))
    });
    assert!(result.is_err());

    assert_eq!(dump(&dir, "items"), base_before);
    assert_eq!(dump(&dir, "items_vec"), mirror_before);
}

#[test]
fn test_stored_bytes_match_codec_output() {
    let (dir, client) = test_client();
    let embedding = vec![0.25f32, -0.75, 1.5, -3.0];
    let rowids = client
        .add(&vec!["codec".to_string()], &vec![embedding.clone()], None)
        .unwrap();

    let expected: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
    let base = dump(&dir, "items");
    assert_eq!(base[&rowids[0]], expected);
    assert_eq!(dump(&dir, "items_vec")[&rowids[0]], expected);
}
