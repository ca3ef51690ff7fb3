//! 테이블 스키마와 쿼리 SQL
//!
//! 테이블/인덱스 이름은 [`TargetTable`]에서만 만들어지며, `Region`과 `Round`가
//! 닫힌 열거형이므로 SQL에 임의 문자열이 끼어들 수 없습니다.
//! 일시는 `YYYY-MM-DD HH:MM:SS` 텍스트로 저장되어 사전순이 시간순과 같습니다.

use urnlog_core::types::TargetTable;

/// 테이블과 인덱스를 지우고 다시 만듭니다.
///
/// `AUTOINCREMENT` 테이블을 지우면 `sqlite_sequence` 항목도 함께 지워지므로
/// 재생성 후 id는 1부터 다시 시작합니다.
pub fn recreate_sql(target: &TargetTable) -> String {
    let table = target.table_name();
    let index = target.index_name();
    format!(
        "DROP TABLE IF EXISTS {table};
         CREATE TABLE {table} (
             id             INTEGER PRIMARY KEY AUTOINCREMENT,
             data_hora      TEXT NOT NULL,
             tipo           VARCHAR(10) NOT NULL,
             pleito         CHAR(8) NOT NULL,
             evento         VARCHAR(15) NOT NULL,
             mensagem       TEXT NOT NULL,
             hash           CHAR(16),
             voto_computado BOOLEAN NOT NULL DEFAULT 0,
             arquivo        TEXT NOT NULL
         );
         CREATE INDEX {index} ON {table} (voto_computado, arquivo, data_hora);"
    )
}

pub fn insert_sql(target: &TargetTable) -> String {
    format!(
        "INSERT INTO {} (data_hora, tipo, pleito, evento, mensagem, hash, voto_computado, arquivo)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        target.table_name()
    )
}

/// 투표 확인 행의 파티션 내 직전 id와 간격(초)
fn vote_window_cte(target: &TargetTable) -> String {
    format!(
        "janela AS (
             SELECT id, arquivo, data_hora,
                    LAG(id) OVER particao AS anterior,
                    CAST(strftime('%s', data_hora) AS INTEGER)
                      - CAST(strftime('%s', LAG(data_hora) OVER particao) AS INTEGER) AS intervalo
               FROM {}
              WHERE voto_computado = 1
             WINDOW particao AS (PARTITION BY arquivo ORDER BY data_hora, id)
         )",
        target.table_name()
    )
}

/// 연쇄 탐지 커서. `?1`은 최대 간격(초).
///
/// 자기 간격이나 다음 행의 간격이 `[0, ?1]`인 행만 선택하고,
/// 자기 간격이 범위를 벗어난 행은 직전 id와 간격을 NULL로 돌려줍니다.
pub fn vote_chain_sql(target: &TargetTable) -> String {
    format!(
        "WITH {},
         vizinhos AS (
             SELECT id, arquivo, data_hora, anterior, intervalo,
                    LEAD(intervalo) OVER (PARTITION BY arquivo ORDER BY data_hora, id) AS intervalo_seguinte
               FROM janela
         )
         SELECT id, arquivo, data_hora,
                CASE WHEN intervalo BETWEEN 0 AND ?1 THEN anterior END AS id_anterior,
                CASE WHEN intervalo BETWEEN 0 AND ?1 THEN intervalo END AS segundos_depois
           FROM vizinhos
          WHERE intervalo BETWEEN 0 AND ?1
             OR intervalo_seguinte BETWEEN 0 AND ?1
          ORDER BY arquivo, data_hora, id",
        vote_window_cte(target)
    )
}

/// 간격 빈도 커서. NULL(파티션 첫 행)이 가장 먼저 옵니다.
pub fn gap_frequency_sql(target: &TargetTable) -> String {
    format!(
        "WITH {}
         SELECT intervalo, COUNT(*) AS frequencia
           FROM janela
          GROUP BY intervalo
          ORDER BY intervalo",
        vote_window_cte(target)
    )
}

pub fn count_sql(target: &TargetTable) -> String {
    format!("SELECT COUNT(*) FROM {}", target.table_name())
}

pub fn select_all_sql(target: &TargetTable) -> String {
    format!(
        "SELECT id, data_hora, tipo, pleito, evento, mensagem, hash, voto_computado, arquivo
           FROM {}
          ORDER BY id",
        target.table_name()
    )
}
