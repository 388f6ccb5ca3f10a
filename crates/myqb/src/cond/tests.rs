//! Tests for the condition compiler.

use super::*;
use crate::ident::Expr;
use serde_json::json;

#[test]
fn empty_condition_is_always_true() {
    assert_eq!(compile(&json!({})).unwrap(), "1");
    assert_eq!(compile(&json!([])).unwrap(), "1");
    assert_eq!(compile(&json!(null)).unwrap(), "1");
    assert_eq!(compile(&json!(false)).unwrap(), "1");
    assert_eq!(compile(&json!(0)).unwrap(), "1");
    assert_eq!(compile(&json!("")).unwrap(), "1");
}

#[test]
fn simple_equality() {
    assert_eq!(compile(&json!({"a": "b"})).unwrap(), "`a`='b'");
}

#[test]
fn integer_equality_is_unquoted() {
    assert_eq!(compile(&json!({"a": 5})).unwrap(), "`a`=5");
}

#[test]
fn float_equality_is_quoted() {
    assert_eq!(compile(&json!({"a": 1.5})).unwrap(), "`a`='1.5'");
}

#[test]
fn bool_renders_as_integer() {
    assert_eq!(compile(&json!({"a": true})).unwrap(), "`a`=1");
    assert_eq!(compile(&json!({"a": false})).unwrap(), "`a`=0");
}

#[test]
fn multiple_terms_join_with_and_and_parenthesize() {
    assert_eq!(
        compile(&json!({"a": 1, "b": "x"})).unwrap(),
        "(`a`=1 AND `b`='x')"
    );
}

#[test]
fn or_group() {
    assert_eq!(
        compile(&json!({"$or": {"a": 1, "b": 2}})).unwrap(),
        "(`a`=1 OR `b`=2)"
    );
}

#[test]
fn or_marker_is_case_insensitive() {
    assert_eq!(
        compile(&json!({"$OR": {"a": 1, "b": 2}})).unwrap(),
        "(`a`=1 OR `b`=2)"
    );
    assert_eq!(
        compile(&json!({"or": {"a": 1, "b": 2}})).unwrap(),
        "(`a`=1 OR `b`=2)"
    );
}

#[test]
fn not_wraps_sub_condition() {
    assert_eq!(compile(&json!({"$not": {"a": 1}})).unwrap(), "(NOT `a`=1)");
    assert_eq!(
        compile(&json!({"not": {"a": 1, "b": 2}})).unwrap(),
        "(NOT (`a`=1 OR `b`=2))"
    );
}

#[test]
fn binop_normal_order() {
    assert_eq!(compile(&json!({"a": {">": 5}})).unwrap(), "(`a`>5)");
    assert_eq!(compile(&json!({"a": {"$lte": 3}})).unwrap(), "(`a`<=3)");
}

#[test]
fn binop_reversed_order_renders_identically() {
    let normal = compile(&json!({"a": {">": 5}})).unwrap();
    let reversed = compile(&json!({">": {"a": 5}})).unwrap();
    assert_eq!(normal, reversed);
    assert_eq!(reversed, "(`a`>5)");
}

#[test]
fn parse_records_operand_order() {
    let normal = parse(&json!({"a": {">": 5}})).unwrap();
    let expected = CondNode::Group {
        joiner: Joiner::And,
        terms: vec![CondNode::Group {
            joiner: Joiner::And,
            terms: vec![CondNode::Binary {
                field: "`a`".to_string(),
                op: BinOp::Gt,
                operand: Operand::Int(5),
                reversed: false,
            }],
        }],
    };
    assert_eq!(normal, expected);

    let reversed = parse(&json!({">": {"a": 5}})).unwrap();
    let expected = CondNode::Group {
        joiner: Joiner::And,
        terms: vec![CondNode::Binary {
            field: "`a`".to_string(),
            op: BinOp::Gt,
            operand: Operand::Int(5),
            reversed: true,
        }],
    };
    assert_eq!(reversed, expected);
}

#[test]
fn like_and_not_like() {
    assert_eq!(
        compile(&json!({"name": {"$like": "%bob%"}})).unwrap(),
        "(`name` LIKE '%bob%')"
    );
    assert_eq!(
        compile(&json!({"name": {"$notlike": "%bob%"}})).unwrap(),
        "(`name` NOT LIKE '%bob%')"
    );
}

#[test]
fn in_set_field_shape() {
    assert_eq!(
        compile(&json!({"$in": {"a": [1, 2, 3]}})).unwrap(),
        "`a` IN (1,2,3)"
    );
}

#[test]
fn in_set_bare_list_uses_current_key() {
    assert_eq!(
        compile(&json!({"a": {"$in": [1, 2, 3]}})).unwrap(),
        "`a` IN (1,2,3)"
    );
}

#[test]
fn in_set_strings_are_quoted_and_escaped() {
    assert_eq!(
        compile(&json!({"$in": {"a": ["x", "o'ra"]}})).unwrap(),
        "`a` IN ('x','o\\'ra')"
    );
}

#[test]
fn in_set_scalar_operand_is_promoted() {
    assert_eq!(compile(&json!({"$in": {"a": 5}})).unwrap(), "`a` IN (5)");
}

#[test]
fn empty_in_set_is_false() {
    assert_eq!(compile(&json!({"$in": {"a": []}})).unwrap(), "false");
    assert_eq!(compile(&json!({"$in": {"a": null}})).unwrap(), "false");
}

#[test]
fn nin_and_notin_negate() {
    assert_eq!(
        compile(&json!({"$nin": {"a": [1, 2]}})).unwrap(),
        "`a` NOT IN (1,2)"
    );
    assert_eq!(
        compile(&json!({"$notin": {"a": [1, 2]}})).unwrap(),
        "`a` NOT IN (1,2)"
    );
}

#[test]
fn null_equality_is_is_null() {
    assert_eq!(compile(&json!({"a": null})).unwrap(), "`a` IS NULL");
}

#[test]
fn not_equal_term() {
    assert_eq!(compile(&json!({"!=": {"a": "b"}})).unwrap(), "`a`<>'b'");
    assert_eq!(compile(&json!({"<>": {"a": "b"}})).unwrap(), "`a`<>'b'");
}

#[test]
fn not_equal_null_is_is_not_null() {
    assert_eq!(
        compile(&json!({"!=": {"a": null}})).unwrap(),
        "`a` IS NOT NULL"
    );
}

#[test]
fn multi_operator_range() {
    assert_eq!(
        compile(&json!({"a": [{">": 1}, {"<": 10}]})).unwrap(),
        "((`a`>1) AND (`a`<10))"
    );
}

#[test]
fn multi_operator_range_stays_conjunctive_under_or() {
    assert_eq!(
        compile(&json!({"$or": {"a": [{">": 1}, {"<": 10}], "b": 1}})).unwrap(),
        "(((`a`>1) AND (`a`<10)) OR `b`=1)"
    );
}

#[test]
fn positional_list_of_sub_conditions() {
    assert_eq!(
        compile(&json!([{"a": 1}, {"b": 2}])).unwrap(),
        "(`a`=1 AND `b`=2)"
    );
}

#[test]
fn numeric_mapping_keys_recurse_as_sub_conditions() {
    assert_eq!(
        compile(&json!({"0": {"a": 1, "b": 2}})).unwrap(),
        "(`a`=1 AND `b`=2)"
    );
    assert_eq!(
        compile(&json!({"0": [{"a": 1}, {"b": 2}]})).unwrap(),
        "(`a`=1 AND `b`=2)"
    );
}

#[test]
fn nested_or_inside_and() {
    assert_eq!(
        compile(&json!({"status": "on", "$or": {"a": 1, "b": 2}})).unwrap(),
        "(`status`='on' AND (`a`=1 OR `b`=2))"
    );
}

#[test]
fn qualified_key_is_not_quoted() {
    assert_eq!(compile(&json!({"u.id": 5})).unwrap(), "u.id=5");
}

#[test]
fn raw_expr_value_renders_bare() {
    let tree = json!({"created": Expr::new("NOW()").to_value()});
    assert_eq!(compile(&tree).unwrap(), "`created`=NOW()");
}

#[test]
fn raw_expr_key_renders_bare() {
    let key = Expr::new("UNIX_TIMESTAMP(`date`)").to_value();
    let key = key.as_str().unwrap().to_string();
    let tree = json!({ key: {">": 100} });
    assert_eq!(compile(&tree).unwrap(), "(UNIX_TIMESTAMP(`date`)>100)");
}

#[test]
fn string_condition_passes_through() {
    assert_eq!(compile(&json!("a=b")).unwrap(), "a=b");
}

#[test]
fn escaping_applies_to_text_values() {
    assert_eq!(
        compile(&json!({"a": "o'ra"})).unwrap(),
        "`a`='o\\'ra'"
    );
}

#[test]
fn no_escape_leaves_column_references_bare() {
    assert_eq!(
        compile_no_escape(&json!({"u.id": "t.uid"})).unwrap(),
        "u.id=t.uid"
    );
    assert_eq!(
        compile_no_escape(&json!({"u.id": "t.uid", "t.kind": 2})).unwrap(),
        "(u.id=t.uid AND t.kind=2)"
    );
}

#[test]
fn composite_equality_operand_is_rejected() {
    let err = compile(&json!({"a": {"x": 1, "y": 2}})).unwrap_err();
    assert!(err.is_invalid_value());
}

#[test]
fn raw_expr_in_in_list_is_rejected() {
    let tree = json!({"$in": {"a": [Expr::new("NOW()").to_value()]}});
    assert!(compile(&tree).unwrap_err().is_invalid_value());
}

#[test]
fn depth_limit_rejects_hostile_nesting() {
    let mut tree = json!({"a": 1});
    for _ in 0..(MAX_DEPTH + 2) {
        tree = json!({ "$not": tree });
    }
    assert!(compile(&tree).unwrap_err().is_depth_exceeded());
}

#[test]
fn depth_limit_allows_reasonable_nesting() {
    let mut tree = json!({"a": 1});
    for _ in 0..8 {
        tree = json!({ "$not": tree });
    }
    assert!(compile(&tree).is_ok());
}

#[test]
fn compile_is_deterministic() {
    let tree = json!({"a": {">": 5}, "$or": {"b": 1, "c": "x"}});
    assert_eq!(compile(&tree).unwrap(), compile(&tree).unwrap());
}
