#[cfg(test)]
mod tests {
    use crate::metadata::LiteralValue;
    use crate::model::{ExprKind, Keyword, PropertyName, TypeExpr};
    use crate::parse::parse_source;
    use pretty_assertions::assert_eq;

    const CAT_DTO: &str = r#"
import { Owner } from '../owners/owner.dto';
import { Color } from './color.enum';
import Base from './base';

export enum Role {
  Admin = 'admin',
  User = 'user',
}

type Roles = Role[];

export class CreateCatDto {
  /**
   * The name of the cat
   * @example "Tom"
   */
  @ApiProperty({ description: 'explicit', type: () => String })
  @MaxLength(20)
  name?: string;

  age: number = 3 as number;

  static registry: Map<string, CreateCatDto>;

  roles: Array<Role> = [Role.Admin];

  owner: Owner | null;

  ['computed']: string;

  #secret: string;

  'quoted-key': string;

  address: { street: string; zip?: number };

  @ApiHideProperty()
  internal: string;

  tags: Roles;

  greet() {
    return 'hi';
  }
}
"#;

    #[test]
    fn test_type_index() {
        let file = parse_source(CAT_DTO, "src/cats/cat.dto.ts").unwrap();
        assert_eq!(file.index.enums, vec!["Role".to_string()]);
        assert_eq!(
            file.index.aliases.get("Roles"),
            Some(&TypeExpr::array_of(TypeExpr::reference("Role")))
        );
        let owner = file.index.imports.get("Owner").unwrap();
        assert_eq!(owner.module, "../owners/owner.dto");
        assert_eq!(owner.imported, "Owner");
        assert_eq!(file.index.imports.get("Base").unwrap().imported, "default");
        assert!(file.index.imports.contains_key("Color"));
    }

    #[test]
    fn test_class_properties() {
        let file = parse_source(CAT_DTO, "src/cats/cat.dto.ts").unwrap();
        assert_eq!(file.classes.len(), 1);
        let class = &file.classes[0];
        assert_eq!(class.name.as_deref(), Some("CreateCatDto"));

        let names: Vec<Option<&PropertyName>> =
            class.properties.iter().map(|p| p.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                Some(&PropertyName::Identifier("name".into())),
                Some(&PropertyName::Identifier("age".into())),
                Some(&PropertyName::Identifier("registry".into())),
                Some(&PropertyName::Identifier("roles".into())),
                Some(&PropertyName::Identifier("owner".into())),
                Some(&PropertyName::Computed("'computed'".into())),
                Some(&PropertyName::Private("secret".into())),
                Some(&PropertyName::Quoted("quoted-key".into())),
                Some(&PropertyName::Identifier("address".into())),
                Some(&PropertyName::Identifier("internal".into())),
                Some(&PropertyName::Identifier("tags".into())),
            ]
        );

        let name = &class.properties[0];
        assert!(name.optional);
        assert_eq!(name.type_expr, Some(TypeExpr::Keyword(Keyword::String)));
        let decorators: Vec<&str> = name.decorators.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(decorators, vec!["ApiProperty", "MaxLength"]);
        let doc = name.doc_comment.as_deref().unwrap();
        assert!(doc.starts_with("/**") && doc.contains("@example \"Tom\""));

        assert!(class.properties[2].is_static);
        assert_eq!(class.properties[9].decorators[0].name, "ApiHideProperty");
    }

    #[test]
    fn test_types_and_initializers() {
        let file = parse_source(CAT_DTO, "src/cats/cat.dto.ts").unwrap();
        let props = &file.classes[0].properties;

        let age = props[1].initializer.as_ref().unwrap();
        assert_eq!(age.text, "3 as number");
        assert_eq!(
            age.unwrap_assertions().kind,
            ExprKind::Literal(LiteralValue::Number(3.0))
        );

        assert_eq!(
            props[3].type_expr,
            Some(TypeExpr::Reference {
                name: "Array".into(),
                arguments: vec![TypeExpr::reference("Role")],
            })
        );
        let roles = props[3].initializer.as_ref().unwrap();
        assert_eq!(
            roles.kind,
            ExprKind::Array(vec![crate::model::RawExpr::path("Role.Admin")])
        );

        assert_eq!(
            props[4].type_expr,
            Some(TypeExpr::Union(vec![TypeExpr::reference("Owner"), TypeExpr::Null]))
        );

        let Some(TypeExpr::ObjectLiteral(members)) = &props[8].type_expr else {
            panic!("address should be an inline literal");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].identifier_name(), Some("zip"));
        assert!(members[1].optional);
        assert_eq!(members[1].type_expr, Some(TypeExpr::Keyword(Keyword::Number)));
    }

    #[test]
    fn test_decorator_arguments() {
        let file = parse_source(CAT_DTO, "src/cats/cat.dto.ts").unwrap();
        let name = &file.classes[0].properties[0];

        let ExprKind::Object(entries) = &name.decorators[0].arguments[0].kind else {
            panic!("ApiProperty argument should be an object");
        };
        assert_eq!(entries[0].0, "description");
        assert_eq!(
            entries[0].1.kind,
            ExprKind::Literal(LiteralValue::String("explicit".into()))
        );
        assert_eq!(entries[1].0, "type");
        assert_eq!(
            entries[1].1.kind,
            ExprKind::Arrow(Box::new(crate::model::RawExpr::path("String")))
        );

        assert_eq!(
            name.decorators[1].arguments[0].kind,
            ExprKind::Literal(LiteralValue::Number(20.0))
        );
    }

    #[test]
    fn test_anonymous_and_nested_classes() {
        let source = r#"
export default class {
  a: string;
}
const Named = class Inner {
  b = class { c: number; };
};
"#;
        let file = parse_source(source, "x.ts").unwrap();
        let names: Vec<Option<&str>> = file.classes.iter().map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec![None, Some("Inner"), None]);
    }

    #[test]
    fn test_negative_and_namespaced_decorators() {
        let source = r#"
class Reading {
  @validator.Min(-5)
  value: number = -1;
}
"#;
        let file = parse_source(source, "x.ts").unwrap();
        let value = &file.classes[0].properties[0];
        assert_eq!(value.decorators[0].name, "Min");
        assert_eq!(
            value.decorators[0].arguments[0].kind,
            ExprKind::Literal(LiteralValue::Number(-5.0))
        );
        assert_eq!(
            value.initializer.as_ref().unwrap().as_literal(),
            Some(LiteralValue::Number(-1.0))
        );
    }
}
