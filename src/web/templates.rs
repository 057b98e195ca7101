//! Handlebars sources for the HTML pages.
//!
//! Every page renders into the `layout` template's `body`.

pub const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
</head>
<body>
  <nav>
    <a href="/">Inicio</a>
    <a href="/superheroes/listado">Superhéroes</a>
    <a href="/paises/dashboard">Países</a>
  </nav>
  <main>
    <h1>{{title}}</h1>
    {{{body}}}
  </main>
</body>
</html>
"#;

/// Success banner and validation messages, shared by every form page.
pub const NOTICES: &str = r#"{{#if success}}<p class="success">{{success}}</p>{{/if}}
{{#if error}}<p class="error">{{error}}</p>{{/if}}
{{#if errors}}
<ul class="errors">
  {{#each errors}}<li><strong>{{field}}</strong>: {{message}}</li>{{/each}}
</ul>
{{/if}}
"#;

pub const HOME: &str = r#"<ul>
  <li><a href="/superheroes/listado">Listado de superhéroes</a></li>
  <li><a href="/paises/dashboard">Países hispanohablantes</a></li>
</ul>
"#;

pub const ERROR: &str = r#"<p class="error">{{message}}</p>
<p><a href="/">Volver al inicio</a></p>
"#;

pub const HERO_FIELDS: &str = r#"<label>Nombre de superhéroe <input name="nombreSuperHeroe" value="{{form.nombreSuperHeroe}}" required></label>
<label>Nombre real <input name="nombreReal" value="{{form.nombreReal}}" required></label>
<label>Edad <input name="edad" type="number" min="0" value="{{form.edad}}" required></label>
<label>Planeta de origen <input name="planetaOrigen" value="{{form.planetaOrigen}}"></label>
<label>Debilidad <input name="debilidad" value="{{form.debilidad}}"></label>
<label>Poderes (separados por coma) <input name="poderes" value="{{form.poderes}}" required></label>
<label>Aliados (separados por coma) <input name="aliados" value="{{form.aliados}}"></label>
<label>Enemigos (separados por coma) <input name="enemigos" value="{{form.enemigos}}"></label>
"#;

pub const HERO_LIST: &str = r#"{{> notices}}
<p><a href="/superheroes/add">Agregar</a> · <a href="/superheroes/edit">Editar</a> · <a href="/superheroes/delete">Eliminar</a></p>
{{#if superheroes}}
<table>
  <thead>
    <tr><th>ID</th><th>Superhéroe</th><th>Nombre real</th><th>Edad</th><th>Planeta</th><th>Debilidad</th><th>Poderes</th><th>Aliados</th><th>Enemigos</th></tr>
  </thead>
  <tbody>
    {{#each superheroes}}
    <tr>
      <td>{{id}}</td>
      <td>{{nombreSuperHeroe}}</td>
      <td>{{nombreReal}}</td>
      <td>{{edad}}</td>
      <td>{{planetaOrigen}}</td>
      <td>{{debilidad}}</td>
      <td>{{#each poderes}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}</td>
      <td>{{#each aliados}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}</td>
      <td>{{#each enemigos}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}</td>
    </tr>
    {{/each}}
  </tbody>
</table>
{{else}}
<p>No hay superhéroes registrados.</p>
{{/if}}
"#;

pub const HERO_ADD: &str = r#"{{> notices}}
<form method="post" action="/superheroes/add">
  {{> hero_fields}}
  <button type="submit">Guardar</button>
</form>
"#;

pub const HERO_EDIT: &str = r#"{{> notices}}
<form method="post" action="/superheroes/edit/find">
  <label>ID <input name="id" value="{{id}}" required></label>
  <button type="submit">Buscar</button>
</form>
{{#if id}}{{#if form}}
<form method="post" action="/superheroes/edit/{{id}}/save">
  {{> hero_fields}}
  <button type="submit">Guardar cambios</button>
</form>
{{/if}}{{/if}}
"#;

pub const HERO_DELETE: &str = r#"{{> notices}}
<form method="post" action="/superheroes/delete/find">
  <label>ID <input name="id" value="{{superhero.id}}" required></label>
  <button type="submit">Buscar</button>
</form>
{{#if superhero}}
<dl>
  <dt>Superhéroe</dt><dd>{{superhero.nombreSuperHeroe}}</dd>
  <dt>Nombre real</dt><dd>{{superhero.nombreReal}}</dd>
  <dt>Edad</dt><dd>{{superhero.edad}}</dd>
  <dt>Planeta</dt><dd>{{superhero.planetaOrigen}}</dd>
</dl>
<form method="post" action="/superheroes/delete/{{superhero.id}}/confirm">
  <button type="submit">Confirmar eliminación</button>
</form>
{{/if}}
"#;

pub const COUNTRY_FIELDS: &str = r#"<label>Nombre <input name="name" value="{{form.name}}" required></label>
<label>Capital <input name="capital" value="{{form.capital}}" required></label>
<label>Fronteras (códigos separados por coma) <input name="borders" value="{{form.borders}}"></label>
<label>Área (km²) <input name="area" type="number" step="any" min="1" value="{{form.area}}" required></label>
<label>Población <input name="population" type="number" min="1" value="{{form.population}}" required></label>
<label>GINI <input name="gini" type="number" step="any" min="0" max="100" value="{{form.gini}}"></label>
<label>Zonas horarias (separadas por coma) <input name="timezones" value="{{form.timezones}}"></label>
<label>Región <input name="region" value="{{form.region}}"></label>
<label>Subregión <input name="subregion" value="{{form.subregion}}"></label>
"#;

pub const COUNTRY_DASHBOARD: &str = r#"{{> notices}}
<p><a href="/paises/agregar">Agregar</a> · <a href="/paises/editar">Editar</a> · <a href="/paises/eliminar">Eliminar</a></p>
<p>Países: {{totals.count}} · Población total: {{totals.population}} · Área total: {{totals.area}} km²</p>
{{#if countries}}
<table>
  <thead>
    <tr><th>ID</th><th>Nombre</th><th>Capital</th><th>Región</th><th>Subregión</th><th>Fronteras</th><th>Área</th><th>Población</th><th>GINI</th><th>Zonas horarias</th></tr>
  </thead>
  <tbody>
    {{#each countries}}
    <tr>
      <td>{{id}}</td>
      <td>{{name}}</td>
      <td>{{capital}}</td>
      <td>{{region}}</td>
      <td>{{subregion}}</td>
      <td>{{#each borders}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}</td>
      <td>{{area}}</td>
      <td>{{population}}</td>
      <td>{{gini}}</td>
      <td>{{#each timezones}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}</td>
    </tr>
    {{/each}}
  </tbody>
</table>
{{else}}
<p>No hay países registrados.</p>
{{/if}}
"#;

pub const COUNTRY_ADD: &str = r#"{{> notices}}
<form method="post" action="/paises/agregar">
  {{> country_fields}}
  <button type="submit">Guardar</button>
</form>
"#;

pub const COUNTRY_EDIT: &str = r#"{{> notices}}
<form method="post" action="/paises/editar/buscar">
  <label>ID <input name="id" value="{{id}}" required></label>
  <button type="submit">Buscar</button>
</form>
{{#if id}}{{#if form}}
<form method="post" action="/paises/editar/{{id}}">
  {{> country_fields}}
  <button type="submit">Guardar cambios</button>
</form>
{{/if}}{{/if}}
"#;

pub const COUNTRY_DELETE: &str = r#"{{> notices}}
<form method="post" action="/paises/eliminar/buscar">
  <label>ID <input name="id" value="{{country.id}}" required></label>
  <button type="submit">Buscar</button>
</form>
{{#if country}}
<dl>
  <dt>Nombre</dt><dd>{{country.name}}</dd>
  <dt>Capital</dt><dd>{{country.capital}}</dd>
  <dt>Región</dt><dd>{{country.region}}</dd>
  <dt>Población</dt><dd>{{country.population}}</dd>
  <dt>Área</dt><dd>{{country.area}}</dd>
</dl>
<form method="post" action="/paises/eliminar/{{country.id}}">
  <button type="submit">Confirmar eliminación</button>
</form>
{{/if}}
"#;

/// Page templates by name.
pub const PAGES: [(&str, &str); 11] = [
    ("layout", LAYOUT),
    ("home", HOME),
    ("error", ERROR),
    ("heroes/list", HERO_LIST),
    ("heroes/add", HERO_ADD),
    ("heroes/edit", HERO_EDIT),
    ("heroes/delete", HERO_DELETE),
    ("countries/dashboard", COUNTRY_DASHBOARD),
    ("countries/add", COUNTRY_ADD),
    ("countries/edit", COUNTRY_EDIT),
    ("countries/delete", COUNTRY_DELETE),
];

/// Partials by name.
pub const PARTIALS: [(&str, &str); 3] = [
    ("notices", NOTICES),
    ("hero_fields", HERO_FIELDS),
    ("country_fields", COUNTRY_FIELDS),
];
