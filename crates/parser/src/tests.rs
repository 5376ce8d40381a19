use super::*;
use pretty_assertions::assert_eq;

fn parse_one(sql: &str) -> SelectStatement {
    let mut statements = parse_sql(sql).expect("parse should succeed");
    assert_eq!(statements.len(), 1);
    match statements.remove(0) {
        Statement::Select(select) => select,
    }
}

#[test]
fn parses_simple_star_select() {
    let select = parse_one("SELECT * FROM t");
    assert_eq!(
        select,
        SelectStatement {
            distinct: false,
            projection: vec![ProjectionItem::Asterisk],
            from: vec![TableRef::new("t")],
            where_clause: vec![],
        }
    );
}

#[test]
fn distinct_keyword_is_recognized() {
    let select = parse_one("SELECT DISTINCT ac FROM areacodes");
    assert!(select.distinct);
}

#[test]
fn distinct_after_first_projection_item_is_rejected() {
    let err = parse_sql("SELECT ac, DISTINCT state FROM areacodes").unwrap_err();
    assert!(matches!(err, EngineError::InvalidSql(_)));
}

#[test]
fn non_select_statement_is_unsupported() {
    let err = parse_sql("DELETE FROM t").unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedOperation(_)));
}

#[test]
fn qualified_projection_field_keeps_table_alias_and_defaults_alias_to_name() {
    let select = parse_one("SELECT t.ac FROM areacodes t");
    match &select.projection[0] {
        ProjectionItem::Field(field) => {
            assert_eq!(field.table_alias.as_deref(), Some("t"));
            assert_eq!(field.name, "ac");
            assert_eq!(field.alias, "ac");
        }
        other => panic!("expected a field projection, got {other:?}"),
    }
}

#[test]
fn projection_alias_with_as_keyword_is_applied() {
    let select = parse_one("SELECT ac AS area_code FROM areacodes");
    match &select.projection[0] {
        ProjectionItem::Field(field) => assert_eq!(field.alias, "area_code"),
        other => panic!("expected a field projection, got {other:?}"),
    }
}

#[test]
fn projection_alias_without_as_keyword_is_applied() {
    let select = parse_one("SELECT ac area_code FROM areacodes");
    match &select.projection[0] {
        ProjectionItem::Field(field) => assert_eq!(field.alias, "area_code"),
        other => panic!("expected a field projection, got {other:?}"),
    }
}

#[test]
fn table_alias_defaults_to_table_name() {
    let select = parse_one("SELECT * FROM areacodes");
    assert_eq!(select.from[0].alias, "areacodes");
}

#[test]
fn comma_separated_from_list_parses_every_table() {
    let select = parse_one("SELECT * FROM a, b, c");
    assert_eq!(
        select.from.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn comma_separated_from_list_after_a_join_still_parses_every_table() {
    // Regression for the source's weakness (§9): a comma-joined table must
    // be picked up even when the preceding table_ref already consumed join
    // clauses of its own.
    let select = parse_one("SELECT * FROM a JOIN b ON a.id = b.id, c");
    assert_eq!(
        select.from.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
    assert_eq!(select.from[0].joins.len(), 1);
}

#[test]
fn plain_join_defaults_to_inner() {
    let select = parse_one("SELECT * FROM a JOIN b ON a.id = b.id");
    assert_eq!(select.from[0].joins[0].kind, JoinKind::Inner);
}

#[test]
fn left_outer_join_is_recognized() {
    let select = parse_one("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.id");
    assert_eq!(select.from[0].joins[0].kind, JoinKind::LeftOuter);
}

#[test]
fn right_join_without_outer_keyword_is_recognized() {
    let select = parse_one("SELECT * FROM a RIGHT JOIN b ON a.id = b.id");
    assert_eq!(select.from[0].joins[0].kind, JoinKind::RightOuter);
}

#[test]
fn where_clause_parses_flat_condition_list() {
    let select = parse_one("SELECT * FROM t WHERE a = 1 AND b = 2");
    assert_eq!(select.where_clause.len(), 3);
    assert!(matches!(select.where_clause[1], ConditionNode::Operator(BooleanOp::And)));
}

#[test]
fn between_predicate_parses() {
    let select = parse_one("SELECT * FROM t WHERE a BETWEEN 1 AND 10");
    match &select.where_clause[0] {
        ConditionNode::Comparison(Comparison::Between(_, lo, hi)) => {
            assert_eq!(lo.to_string(), "1");
            assert_eq!(hi.to_string(), "10");
        }
        other => panic!("expected BETWEEN, got {other:?}"),
    }
}

#[test]
fn not_binds_to_the_single_following_condition() {
    let select = parse_one("SELECT * FROM t WHERE NOT a = 1 AND b = 2");
    assert!(matches!(select.where_clause[0], ConditionNode::Not(_)));
    assert!(matches!(select.where_clause[1], ConditionNode::Operator(BooleanOp::And)));
}

#[test]
fn parenthesized_condition_group_parses_as_nested_list_not_the_source_bug() {
    let select = parse_one("SELECT * FROM t WHERE (a = 1 OR b = 2) AND c = 3");
    match &select.where_clause[0] {
        ConditionNode::Group(inner) => assert_eq!(inner.len(), 3),
        other => panic!("expected a Group, got {other:?}"),
    }
}

#[test]
fn exists_subselect_parses() {
    let select = parse_one("SELECT * FROM t WHERE EXISTS (SELECT * FROM u WHERE u.id = t.id)");
    assert!(matches!(select.where_clause[0], ConditionNode::Exists(_)));
}

#[test]
fn bare_field_without_comparison_operator_is_rejected() {
    let err = parse_sql("SELECT * FROM t WHERE a").unwrap_err();
    assert!(matches!(err, EngineError::InvalidSql(_)));
}

#[test]
fn unexpected_token_reports_invalid_sql_with_lexeme() {
    let err = parse_sql("SELECT * FROM t WHERE a = )").unwrap_err();
    match err {
        EngineError::InvalidSql(message) => assert!(message.contains(')')),
        other => panic!("expected InvalidSql, got {other:?}"),
    }
}

#[test]
fn node_to_string_round_trips_through_the_parser() {
    let node = Comparison::Equals(
        FieldNode::Field(FieldRef::qualified("table", "first")),
        FieldNode::Field(FieldRef::qualified("table", "last")),
    );
    assert_eq!(node.to_string(), "table.first = table.last");

    let select = parse_one(&format!("SELECT * FROM t WHERE {node}"));
    assert_eq!(select.where_clause[0], ConditionNode::Comparison(node));
}

#[test]
fn delimited_identifier_preserves_case_in_table_name() {
    let select = parse_one("SELECT * FROM \"MixedCase\"");
    assert_eq!(select.from[0].name, "MixedCase");
}

#[test]
fn delimited_table_name_round_trips_through_display() {
    let select = parse_one("SELECT * FROM \"MixedCase\"");
    assert_eq!(select.to_string(), "SELECT * FROM \"MixedCase\"");
}

#[test]
fn delimited_column_name_round_trips_through_display() {
    let select = parse_one("SELECT \"Weird Name\" FROM t");
    match &select.projection[0] {
        ProjectionItem::Field(field) => assert_eq!(field.to_string(), "\"Weird Name\""),
        other => panic!("expected a field projection, got {other:?}"),
    }
}
